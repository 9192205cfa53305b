//! End-to-end integration tests for smartflip.
//!
//! The offline tests drive the public API with an in-process chat backend and
//! always run. The live tests make real chat-completion calls and load the
//! pdfium engine, so they are gated behind the `E2E_ENABLED` environment
//! variable.
//!
//! Run with:
//!   E2E_ENABLED=1 SMARTFLIP_API_KEY=sk-... cargo test --test e2e -- --nocapture
//!
//! The live PDF test also needs a document:
//!   E2E_ENABLED=1 SMARTFLIP_E2E_PDF=./apuntes.pdf cargo test --test e2e live_pdf -- --nocapture

use futures::future::{BoxFuture, FutureExt};
use smartflip::{
    extract_for_generation, extract_text, generate, generate_flashcards, generate_quiz,
    generate_test, score_test, ArtifactKind, ArtifactSet, ChatBackend, CompletionRequest,
    DocumentFile, ExtractionConfig, ExtractionProgressCallback, GenerationConfig,
    PdfEngine, ProgressCallback, SmartFlipError, SourceMode, TestAnswer, TestItem, ValidationPolicy,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// Replies with canned text per artifact kind and records every prompt.
struct CannedBackend {
    prompts: Mutex<Vec<String>>,
}

impl CannedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
        })
    }
}

impl ChatBackend for CannedBackend {
    fn name(&self) -> &str {
        "canned"
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, SmartFlipError>> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let reply = match request.max_tokens {
            2000 => "```json\n[{\"front\":\"Lisboa\",\"back\":\"Capital de Portugal\"}]\n```",
            3000 => r#"[{"question":"¿Capital de Italia?","options":["Roma","Milán","Turín","Nápoles"],"correctAnswer":0,"explanation":"Roma es la capital."}]"#,
            _ => r#"Claro: [
                {"type":"multiple","question":"¿Capital de Italia?","options":["Roma","Milán","Turín","Nápoles"],"correctAnswer":0,"explanation":"Roma."},
                {"type":"truefalse","question":"Berlín es la capital de Alemania.","correctAnswer":true,"explanation":"Sí."},
                {"type":"fill","question":"La capital de Francia es ___","correctAnswer":"París","explanation":"París."},
                {"type":"match","question":"Relaciona","options":["España","Grecia"],"matches":["Atenas","Madrid"],"correctAnswer":["Madrid","Atenas"],"explanation":"Capitales."}
            ]"#,
        };
        async move { Ok(reply.to_string()) }.boxed()
    }
}

fn canned_config(backend: Arc<CannedBackend>) -> GenerationConfig {
    GenerationConfig::builder()
        .backend(backend)
        .build()
        .expect("config should build")
}

fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file(
        "word/document.xml",
        zip::write::SimpleFileOptions::default(),
    )
    .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

// ── Extraction ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_plain_text_extraction() {
    let file = DocumentFile::new(b"Hello world".to_vec(), "text/plain", "hello.txt");
    let text = extract_text(&file, &ExtractionConfig::default())
        .await
        .unwrap();
    assert_eq!(text, "Hello world");
}

#[tokio::test]
async fn test_docx_extraction_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("apuntes.docx");
    std::fs::write(
        &path,
        docx_with_paragraphs(&[
            "La fotosíntesis convierte la luz en energía química.",
            "Ocurre en los cloroplastos de las células vegetales.",
        ]),
    )
    .unwrap();

    let file = DocumentFile::from_path(&path).await.unwrap();
    let text = extract_for_generation(&file, &ExtractionConfig::default())
        .await
        .unwrap();
    assert!(text.starts_with("La fotosíntesis"));
    assert!(text.contains("energía química.\n\nOcurre"));
    assert!(text.ends_with("vegetales."));
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    let err = DocumentFile::from_path("/definitely/not/here.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, SmartFlipError::FileNotFound { .. }));
}

#[tokio::test]
async fn test_callback_is_shared_across_tasks() {
    #[derive(Default)]
    struct Log(Mutex<Vec<String>>);
    impl ExtractionProgressCallback for Log {
        fn on_extraction_start(&self, total: usize) {
            self.0.lock().unwrap().push(format!("start {total}"));
        }
        fn on_extraction_complete(&self, total: usize, success: usize) {
            self.0.lock().unwrap().push(format!("done {success}/{total}"));
        }
    }

    let log = Arc::new(Log::default());
    let cb: ProgressCallback = log.clone();
    let config = ExtractionConfig::builder()
        .progress_callback(cb)
        .build()
        .unwrap();

    let handle = tokio::spawn(async move {
        let file = DocumentFile::new(b"hola".to_vec(), "text/plain", "a.txt");
        extract_text(&file, &config).await
    });
    handle.await.unwrap().unwrap();

    assert_eq!(*log.0.lock().unwrap(), vec!["start 1", "done 1/1"]);
}

// ── Generation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_every_kind_through_one_backend() {
    let backend = CannedBackend::new();
    let config = canned_config(backend.clone());

    let cards = generate_flashcards("Capitales de Europa", SourceMode::Topic, &config)
        .await
        .unwrap();
    assert_eq!(cards[0].front, "Lisboa");

    let quiz = generate_quiz("Capitales de Europa", SourceMode::Topic, &config)
        .await
        .unwrap();
    assert_eq!(quiz[0].correct_option(), Some("Roma"));

    let test = generate_test("Capitales de Europa", SourceMode::Topic, &config)
        .await
        .unwrap();
    let tags: Vec<_> = test.iter().map(TestItem::type_tag).collect();
    assert_eq!(tags, ["multiple", "truefalse", "fill", "match"]);

    let prompts = backend.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    assert!(prompts.iter().all(|p| p.contains("Capitales de Europa")));
}

#[tokio::test]
async fn test_document_to_test_to_score() {
    let long = "Roma es la capital de Italia. Berlín es la capital de Alemania. \
                París es la capital de Francia. Madrid es la capital de España.";
    let file = DocumentFile::new(long.as_bytes().to_vec(), "text/plain", "capitales.txt");
    let text = extract_for_generation(&file, &ExtractionConfig::default())
        .await
        .unwrap();

    let config = canned_config(CannedBackend::new());
    let set = generate(&text, SourceMode::FileText, ArtifactKind::Test, &config)
        .await
        .unwrap();
    let ArtifactSet::Test(items) = set else {
        panic!("expected a test set");
    };

    let answers = vec![
        Some(TestAnswer::Choice(0)),
        Some(TestAnswer::Bool(false)),
        Some(TestAnswer::Text("parís".into())),
        Some(TestAnswer::Pairs(vec!["Madrid".into(), "Atenas".into()])),
    ];
    let score = score_test(&items, &answers);
    assert_eq!(score.correct, 3);
    assert_eq!(score.percentage, 75);
    assert_eq!(score.score_out_of_10, 7.5);
}

#[tokio::test]
async fn test_artifact_set_serialises_as_plain_array() {
    let config = canned_config(CannedBackend::new());
    let set = generate("x", SourceMode::PastedText, ArtifactKind::Quiz, &config)
        .await
        .unwrap();
    let json = serde_json::to_value(&set).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["correctAnswer"], 0);
}

// ── Live API ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn live_flashcards_capitals_of_europe() {
    e2e_skip_unless_enabled!();

    let config = GenerationConfig::builder()
        .validation(ValidationPolicy::Lenient)
        .build()
        .unwrap();
    let cards = match generate_flashcards("Capitales de Europa", SourceMode::Topic, &config).await
    {
        Ok(cards) => cards,
        Err(SmartFlipError::BackendNotConfigured { hint }) => {
            println!("SKIP: {hint}");
            return;
        }
        Err(e) => panic!("live generation failed: {e}"),
    };

    println!("{} flashcards", cards.len());
    assert!(
        (5..=50).contains(&cards.len()),
        "unexpected card count {}",
        cards.len()
    );
    for card in &cards {
        assert!(!card.front.trim().is_empty());
        assert!(!card.back.trim().is_empty());
    }
}

#[tokio::test]
async fn live_quiz_has_four_options() {
    e2e_skip_unless_enabled!();

    let config = GenerationConfig::default();
    let quiz = match generate_quiz(
        "El sistema solar: planetas, satélites y el Sol.",
        SourceMode::PastedText,
        &config,
    )
    .await
    {
        Ok(quiz) => quiz,
        Err(SmartFlipError::BackendNotConfigured { hint }) => {
            println!("SKIP: {hint}");
            return;
        }
        Err(e) => panic!("live generation failed: {e}"),
    };

    assert!(!quiz.is_empty());
    for q in &quiz {
        assert_eq!(q.options.len(), 4, "question {:?}", q.question);
        assert!(q.correct_option().is_some());
    }
}

#[tokio::test]
async fn live_pdf_extraction() {
    e2e_skip_unless_enabled!();
    let Some(path) = std::env::var_os("SMARTFLIP_E2E_PDF").map(PathBuf::from) else {
        println!("SKIP: set SMARTFLIP_E2E_PDF to a PDF file");
        return;
    };

    let file = DocumentFile::from_path(&path).await.unwrap();
    let config = ExtractionConfig::builder().max_pages(3).build().unwrap();
    let text = extract_text(&file, &config).await.unwrap();

    println!("{} chars from {}", text.chars().count(), path.display());
    assert!(!text.trim().is_empty());
    assert_eq!(text, text.trim());

    assert!(PdfEngine::is_loaded());
    let engine = PdfEngine::ensure_loaded().unwrap();
    assert!(engine.library_path().is_file());
}
