//! Content Requester: prompt → completion → JSON array → typed artifacts.
//!
//! ```text
//! source text ─▶ prompts::build_prompt ─▶ ChatBackend::complete
//!                                               │
//!            Vec<T> ◀─ decode + check ◀─ salvage::extract_json_array
//! ```
//!
//! One awaited request per call. Nothing is retried and nothing is cached; a
//! failure at any step is returned to the caller as-is.

use crate::artifact::{
    Artifact, ArtifactKind, ArtifactSet, Flashcard, QuizQuestion, SourceMode, TestItem,
    ValidationPolicy,
};
use crate::config::GenerationConfig;
use crate::error::SmartFlipError;
use crate::pipeline::request::{resolve_backend, CompletionRequest};
use crate::pipeline::salvage::extract_json_array;
use crate::prompts::build_prompt;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate study material of the requested kind.
///
/// # Errors
///
/// Transport failures from the backend, [`SmartFlipError::UnparsableResponse`]
/// when no JSON array can be recovered, [`SmartFlipError::EmptyResult`] when
/// the array holds no usable items, and [`SmartFlipError::MalformedArtifact`]
/// when an item fails to decode or (under [`ValidationPolicy::Strict`]) breaks
/// an invariant.
pub async fn generate(
    source_text: &str,
    mode: SourceMode,
    kind: ArtifactKind,
    config: &GenerationConfig,
) -> Result<ArtifactSet, SmartFlipError> {
    match kind {
        ArtifactKind::Flashcards => generate_typed::<Flashcard>(source_text, mode, config)
            .await
            .map(ArtifactSet::Flashcards),
        ArtifactKind::Quiz => generate_typed::<QuizQuestion>(source_text, mode, config)
            .await
            .map(ArtifactSet::Quiz),
        ArtifactKind::Test => generate_typed::<TestItem>(source_text, mode, config)
            .await
            .map(ArtifactSet::Test),
    }
}

/// Generate flashcards.
pub async fn generate_flashcards(
    source_text: &str,
    mode: SourceMode,
    config: &GenerationConfig,
) -> Result<Vec<Flashcard>, SmartFlipError> {
    generate_typed(source_text, mode, config).await
}

/// Generate four-option quiz questions.
pub async fn generate_quiz(
    source_text: &str,
    mode: SourceMode,
    config: &GenerationConfig,
) -> Result<Vec<QuizQuestion>, SmartFlipError> {
    generate_typed(source_text, mode, config).await
}

/// Generate a mixed-format practice test.
pub async fn generate_test(
    source_text: &str,
    mode: SourceMode,
    config: &GenerationConfig,
) -> Result<Vec<TestItem>, SmartFlipError> {
    generate_typed(source_text, mode, config).await
}

async fn generate_typed<T: Artifact>(
    source_text: &str,
    mode: SourceMode,
    config: &GenerationConfig,
) -> Result<Vec<T>, SmartFlipError> {
    let kind = T::KIND;
    let start = Instant::now();
    let backend = resolve_backend(config)?;

    let request = CompletionRequest {
        prompt: build_prompt(source_text, mode, kind),
        model: config.model.clone(),
        temperature: config.temperature,
        max_tokens: config.max_tokens_for(kind),
    };
    info!(
        "Generating {} from {:?} ({} chars) via {}",
        kind,
        mode,
        source_text.chars().count(),
        backend.name()
    );

    let reply = backend.complete(&request).await?;
    debug!("Reply: {} chars", reply.len());

    let values = extract_json_array(&reply)?;
    if values.is_empty() {
        return Err(SmartFlipError::EmptyResult {
            kind: kind.to_string(),
        });
    }

    let items = decode_items::<T>(values, config.validation)?;
    if items.is_empty() {
        return Err(SmartFlipError::EmptyResult {
            kind: kind.to_string(),
        });
    }

    info!(
        "Generated {} {} in {}ms",
        items.len(),
        kind,
        start.elapsed().as_millis()
    );
    Ok(items)
}

/// Decode each array element into `T` and apply the validation policy.
///
/// `Strict` and `Off` fail on the first element that does not decode; only
/// `Strict` also runs [`Artifact::check`]. `Lenient` drops both kinds of bad
/// element.
pub(crate) fn decode_items<T: Artifact>(
    values: Vec<Value>,
    policy: ValidationPolicy,
) -> Result<Vec<T>, SmartFlipError> {
    let mut items = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let outcome = serde_json::from_value::<T>(value)
            .map_err(|e| e.to_string())
            .and_then(|item| match policy {
                ValidationPolicy::Off => Ok(item),
                ValidationPolicy::Strict | ValidationPolicy::Lenient => item.check().map(|()| item),
            });

        match outcome {
            Ok(item) => items.push(item),
            Err(reason) if policy == ValidationPolicy::Lenient => {
                warn!("Dropping {} item {}: {}", T::KIND, index, reason);
            }
            Err(reason) => {
                return Err(SmartFlipError::MalformedArtifact {
                    kind: T::KIND.to_string(),
                    index,
                    reason,
                })
            }
        }
    }

    Ok(items)
}
