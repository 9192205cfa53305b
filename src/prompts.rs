//! Prompt templates for study-material generation.
//!
//! The JSON shapes requested here must stay in step with the field names in
//! [`crate::artifact`]. [`template`] maps every (kind, source) pair to one
//! of six constants, so each can be inspected without calling a model.
//!
//! Templates are written in Spanish, the product's language. Each contains
//! the [`CONTENT_PLACEHOLDER`] exactly once; [`build_prompt`] substitutes the
//! topic or source text there.

use crate::artifact::{ArtifactKind, PromptSource, SourceMode};

/// Marker replaced by the topic or the supplied text.
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Flashcards extracted from supplied text.
pub const FLASHCARDS_FROM_TEXT: &str = r#"Eres un asistente educativo especializado en crear tarjetas de estudio. Extrae el contenido más importante del siguiente texto y conviértelo en tarjetas de estudio efectivas.

Texto a analizar:
{content}

Instrucciones:
1. Identifica los términos, conceptos o frases clave del texto.
2. Para cada término escribe una definición clara y concisa basada en el texto.
3. Las tarjetas deben ser educativas y fáciles de entender.
4. Crea entre 5 y 50 tarjetas según el contenido disponible.
5. El frente debe ser breve (de 1 a 10 palabras).
6. El reverso debe ser claro y educativo (máximo 50 palabras).

Responde ÚNICAMENTE con un array JSON válido con este formato exacto:
[
  {
    "front": "Término o concepto",
    "back": "Definición o explicación clara"
  }
]

NO incluyas texto fuera del array JSON."#;

/// Flashcards generated from a named topic.
pub const FLASHCARDS_FROM_TOPIC: &str = r#"Eres un asistente educativo especializado en crear tarjetas de estudio. Crea tarjetas educativas sobre el tema: "{content}"

Instrucciones:
1. Crea las tarjetas necesarias para estudiar el tema: mínimo 5 y máximo 50.
2. Cada tarjeta lleva un término o concepto claro en el frente.
3. La definición del reverso debe ser educativa y precisa.
4. Adapta el enfoque al tipo de tema:
   - Lugares: el lugar como término y sus datos clave como definición.
   - Historia: eventos o personas como términos; fechas e importancia como definición.
   - Ciencia: conceptos como términos; explicaciones como definición.
   - Idiomas: palabras en un idioma como términos; traducciones como definición.
5. El frente debe ser breve (de 1 a 5 palabras).
6. El reverso debe ser claro y educativo (máximo 50 palabras).
7. Prioriza los conceptos más relevantes para estudiar y para exámenes.

Responde ÚNICAMENTE con un array JSON válido con este formato exacto:
[
  {
    "front": "Término o concepto",
    "back": "Definición o explicación clara"
  }
]

NO incluyas texto fuera del array JSON."#;

/// Multiple-choice questions extracted from supplied text.
pub const QUIZ_FROM_TEXT: &str = r#"Eres un asistente educativo especializado en crear preguntas de opción múltiple. Extrae el contenido más importante del siguiente texto y crea preguntas con 4 opciones.

Texto a analizar:
{content}

Instrucciones:
1. Identifica los conceptos, hechos o términos clave del texto.
2. Crea entre 5 y 50 preguntas según el contenido disponible.
3. Cada pregunta debe tener:
   - Un enunciado claro y conciso (máximo 100 palabras).
   - Exactamente 4 opciones, de las cuales solo una es correcta.
   - Un índice (0-3) que indique la opción correcta.
   - Una explicación breve (máximo 50 palabras) de por qué esa opción es la correcta.
4. Las preguntas deben ser educativas, relevantes y útiles para estudiar.
5. Las opciones incorrectas deben ser plausibles pero claramente incorrectas.

Responde ÚNICAMENTE con un array JSON válido con este formato exacto:
[
  {
    "question": "Enunciado de la pregunta",
    "options": ["Opción 1", "Opción 2", "Opción 3", "Opción 4"],
    "correctAnswer": 0,
    "explanation": "Explicación de la respuesta correcta"
  }
]

NO incluyas texto fuera del array JSON."#;

/// Multiple-choice questions generated from a named topic.
pub const QUIZ_FROM_TOPIC: &str = r#"Eres un asistente educativo especializado en crear preguntas de opción múltiple. Crea preguntas educativas sobre el tema: "{content}"

Instrucciones:
1. Crea entre 5 y 50 preguntas según la complejidad del tema.
2. Cada pregunta debe tener:
   - Un enunciado claro y conciso (máximo 100 palabras).
   - Exactamente 4 opciones, de las cuales solo una es correcta.
   - Un índice (0-3) que indique la opción correcta.
   - Una explicación breve (máximo 50 palabras) de por qué esa opción es la correcta.
3. Adapta el enfoque al tipo de tema:
   - Lugares: datos clave del lugar.
   - Historia: eventos, fechas o personajes importantes.
   - Ciencia: conceptos, procesos o aplicaciones.
   - Idiomas: vocabulario, gramática o traducciones.
4. Las preguntas deben ser educativas, relevantes y útiles para estudiar.
5. Las opciones incorrectas deben ser plausibles pero claramente incorrectas.

Responde ÚNICAMENTE con un array JSON válido con este formato exacto:
[
  {
    "question": "Enunciado de la pregunta",
    "options": ["Opción 1", "Opción 2", "Opción 3", "Opción 4"],
    "correctAnswer": 0,
    "explanation": "Explicación de la respuesta correcta"
  }
]

NO incluyas texto fuera del array JSON."#;

/// Mixed-format practice test extracted from supplied text.
pub const TEST_FROM_TEXT: &str = r#"Eres un asistente educativo especializado en crear pruebas prácticas. Extrae el contenido más importante del siguiente texto y crea una prueba que mezcle preguntas de opción múltiple, verdadero/falso, completar espacios y emparejamiento.

Texto a analizar:
{content}

Instrucciones:
1. Crea entre 5 y 50 preguntas, con al menos una de cada tipo (opción múltiple, verdadero/falso, completar espacios, emparejamiento).
2. Cada pregunta debe tener:
   - Un enunciado claro y conciso (máximo 100 palabras).
   - Un tipo: "multiple", "truefalse", "fill" o "match".
   - Para "multiple": 4 opciones y el índice (0-3) de la respuesta correcta.
   - Para "truefalse": la respuesta correcta como booleano (true/false).
   - Para "fill": la respuesta correcta como texto (máximo 50 palabras).
   - Para "match": una lista de términos, una lista de definiciones y las respuestas correctas, como arrays de igual longitud.
   - Una explicación breve (máximo 50 palabras) de la respuesta correcta.
3. Las preguntas deben ser educativas, relevantes y útiles para estudiar.
4. Las opciones incorrectas deben ser plausibles pero claramente incorrectas.

Responde ÚNICAMENTE con un array JSON válido con este formato exacto:
[
  {
    "type": "multiple",
    "question": "Enunciado de la pregunta",
    "options": ["Opción 1", "Opción 2", "Opción 3", "Opción 4"],
    "correctAnswer": 0,
    "explanation": "Explicación de la respuesta correcta"
  },
  {
    "type": "truefalse",
    "question": "Enunciado de la pregunta",
    "correctAnswer": true,
    "explanation": "Explicación de la respuesta correcta"
  },
  {
    "type": "fill",
    "question": "Enunciado de la pregunta",
    "correctAnswer": "Respuesta correcta",
    "explanation": "Explicación de la respuesta correcta"
  },
  {
    "type": "match",
    "question": "Enunciado de la pregunta",
    "options": ["Término 1", "Término 2", "Término 3"],
    "matches": ["Definición 1", "Definición 2", "Definición 3"],
    "correctAnswer": ["Definición 1", "Definición 2", "Definición 3"],
    "explanation": "Explicación de la respuesta correcta"
  }
]

NO incluyas texto fuera del array JSON."#;

/// Mixed-format practice test generated from a named topic.
pub const TEST_FROM_TOPIC: &str = r#"Eres un asistente educativo especializado en crear pruebas prácticas. Crea una prueba educativa sobre el tema: "{content}"

Instrucciones:
1. Crea entre 15 y 50 preguntas, con al menos una de cada tipo (opción múltiple, verdadero/falso, completar espacios, emparejamiento).
2. Cada pregunta debe tener:
   - Un enunciado claro y conciso (máximo 100 palabras).
   - Un tipo: "multiple", "truefalse", "fill" o "match".
   - Para "multiple": 4 opciones y el índice (0-3) de la respuesta correcta.
   - Para "truefalse": la respuesta correcta como booleano (true/false).
   - Para "fill": la respuesta correcta como texto (máximo 50 palabras).
   - Para "match": una lista de términos, una lista de definiciones y las respuestas correctas, como arrays de igual longitud.
   - Una explicación breve (máximo 50 palabras) de la respuesta correcta.
3. Adapta el enfoque al tipo de tema:
   - Lugares: datos clave del lugar.
   - Historia: eventos, fechas o personajes importantes.
   - Ciencia: conceptos, procesos o aplicaciones.
   - Idiomas: vocabulario, gramática o traducciones.
4. Las preguntas deben ser educativas, relevantes y útiles para estudiar.
5. Las opciones incorrectas deben ser plausibles pero claramente incorrectas.

Responde ÚNICAMENTE con un array JSON válido con este formato exacto:
[
  {
    "type": "multiple",
    "question": "Enunciado de la pregunta",
    "options": ["Opción 1", "Opción 2", "Opción 3", "Opción 4"],
    "correctAnswer": 0,
    "explanation": "Explicación de la respuesta correcta"
  },
  {
    "type": "truefalse",
    "question": "Enunciado de la pregunta",
    "correctAnswer": true,
    "explanation": "Explicación de la respuesta correcta"
  },
  {
    "type": "fill",
    "question": "Enunciado de la pregunta",
    "correctAnswer": "Respuesta correcta",
    "explanation": "Explicación de la respuesta correcta"
  },
  {
    "type": "match",
    "question": "Enunciado de la pregunta",
    "options": ["Término 1", "Término 2", "Término 3"],
    "matches": ["Definición 1", "Definición 2", "Definición 3"],
    "correctAnswer": ["Definición 1", "Definición 2", "Definición 3"],
    "explanation": "Explicación de la respuesta correcta"
  }
]

NO incluyas texto fuera del array JSON."#;

/// Look up the template for an artifact kind and source mode.
///
/// The match over `(kind, source)` is the lookup table: adding a kind or a
/// prompt family without a template fails to compile.
pub fn template(kind: ArtifactKind, mode: SourceMode) -> &'static str {
    match (kind, mode.prompt_source()) {
        (ArtifactKind::Flashcards, PromptSource::SuppliedText) => FLASHCARDS_FROM_TEXT,
        (ArtifactKind::Flashcards, PromptSource::Topic) => FLASHCARDS_FROM_TOPIC,
        (ArtifactKind::Quiz, PromptSource::SuppliedText) => QUIZ_FROM_TEXT,
        (ArtifactKind::Quiz, PromptSource::Topic) => QUIZ_FROM_TOPIC,
        (ArtifactKind::Test, PromptSource::SuppliedText) => TEST_FROM_TEXT,
        (ArtifactKind::Test, PromptSource::Topic) => TEST_FROM_TOPIC,
    }
}

/// Build the full prompt sent as the single user message.
///
/// The source text is substituted once; braces inside it are left alone.
pub fn build_prompt(source_text: &str, mode: SourceMode, kind: ArtifactKind) -> String {
    template(kind, mode).replacen(CONTENT_PLACEHOLDER, source_text, 1)
}
