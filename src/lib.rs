//! # smartflip
//!
//! Generate flashcards, four-option quizzes and mixed practice tests from a
//! topic, pasted text, or an uploaded PDF / Word / plain-text document, using
//! a chat-completion LLM.
//!
//! ## Two independent components
//!
//! ```text
//! upload ─▶ Document Extractor ─▶ text ─┐
//!                                       ├─▶ Content Requester ─▶ Vec<artifact>
//!                   topic / pasted text ┘
//! ```
//!
//! * **Document Extractor** ([`extract_text`], [`extract_for_generation`]):
//!   `text/plain` via UTF-8 decoding, PDF via pdfium (first 100 pages, 30 s
//!   load timeout), `.docx` via its `word/document.xml`.
//! * **Content Requester** ([`generate`] and the typed helpers): picks one of
//!   six Spanish prompt templates, makes one chat-completion request, recovers
//!   the JSON array from the reply and decodes it into typed artifacts.
//!
//! The two share no state; a caller that only needs extraction never needs an
//! API key.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smartflip::{generate_flashcards, GenerationConfig, SourceMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads SMARTFLIP_API_KEY or DEEPSEEK_API_KEY
//!     let config = GenerationConfig::default();
//!     let cards = generate_flashcards("Capitales de Europa", SourceMode::Topic, &config).await?;
//!     for card in &cards {
//!         println!("{} → {}", card.front, card.back);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! From a document:
//!
//! ```rust,no_run
//! use smartflip::{extract_for_generation, generate, ArtifactKind, DocumentFile,
//!                 ExtractionConfig, GenerationConfig, SourceMode};
//!
//! # async fn run() -> Result<(), smartflip::SmartFlipError> {
//! let file = DocumentFile::from_path("apuntes.pdf").await?;
//! let text = extract_for_generation(&file, &ExtractionConfig::default()).await?;
//! let quiz = generate(&text, SourceMode::FileText, ArtifactKind::Quiz,
//!                     &GenerationConfig::default()).await?;
//! println!("{}", serde_json::to_string_pretty(&quiz).unwrap());
//! # Ok(()) }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `smartflip` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! smartflip = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod generate;
pub mod grading;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::{
    Artifact, ArtifactKind, ArtifactSet, Flashcard, PromptSource, QuizQuestion, SourceMode,
    TestItem, ValidationPolicy,
};
pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, GenerationConfig, GenerationConfigBuilder,
};
pub use engine::PdfEngine;
pub use error::{PageError, SmartFlipError};
pub use extract::{extract_for_generation, extract_text};
pub use generate::{generate, generate_flashcards, generate_quiz, generate_test};
pub use grading::{score_test, TestAnswer, TestScore};
pub use pipeline::input::{is_supported, validate_upload, DocumentFile, DocumentFormat};
pub use pipeline::request::{
    ChatBackend, CompletionRequest, HttpChatBackend, ProviderBackend,
};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
