//! Error types for the smartflip library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SmartFlipError`]: **fatal**. The generation or extraction cannot
//!   produce a result (endpoint refused the request, reply held no JSON
//!   array, unsupported upload, PDF engine missing). Returned as
//!   `Err(SmartFlipError)` from every public entry point.
//!
//! * [`PageError`]: **non-fatal**, a single PDF page could not be read but
//!   the rest of the document is fine. Logged and reported to the
//!   [`crate::progress::ExtractionProgressCallback`], never propagated.
//!
//! Every variant is a separate kind so callers can show format-specific
//! guidance (a scanned PDF needs different advice than a corrupt one).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the smartflip library.
#[derive(Debug, Error)]
pub enum SmartFlipError {
    // ── Chat endpoint errors ──────────────────────────────────────────────
    /// The chat-completion endpoint answered with a non-2xx status.
    #[error("Chat endpoint returned HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("Chat request failed: {reason}\nCheck your internet connection and --api-url.")]
    RequestFailed { reason: String },

    /// The optional per-request timeout elapsed.
    #[error("Chat request timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    /// The HTTP body was not a chat-completion response.
    #[error("Chat endpoint returned an unexpected body: {detail}")]
    InvalidCompletion { detail: String },

    /// Neither the whole reply nor its bracket span parsed as a JSON array.
    #[error("The model reply could not be parsed as a JSON array.\nReply starts with: {snippet:?}")]
    UnparsableResponse { snippet: String },

    /// The reply parsed, but the array held no usable items.
    #[error("The model returned no {kind}. Try different source content.")]
    EmptyResult { kind: String },

    /// An array element did not match the artifact schema.
    #[error("Item {index} of the generated {kind} is malformed: {reason}")]
    MalformedArtifact {
        kind: String,
        index: usize,
        reason: String,
    },

    /// No backend, provider name or API key could be resolved.
    #[error("No chat backend is configured.\n{hint}")]
    BackendNotConfigured { hint: String },

    /// A named `edgequake-llm` provider failed.
    #[error("LLM provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    // ── Upload errors ─────────────────────────────────────────────────────
    /// No decoder exists for the declared MIME type.
    #[error("Unsupported file type {mime_type:?}. Only PDF, TXT and DOCX are accepted.")]
    UnsupportedFormat { mime_type: String },

    /// The upload exceeds the configured size ceiling.
    #[error("File '{name}' is {size} bytes; the maximum is {max} bytes")]
    FileTooLarge { name: String, size: u64, max: u64 },

    /// The input path does not exist or cannot be read.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    // ── Document errors ───────────────────────────────────────────────────
    /// Opening the PDF took longer than the load timeout.
    #[error("Opening the PDF timed out after {secs}s.\nThe document may be too large; try a smaller file.")]
    Timeout { secs: u64 },

    /// The document structure is invalid.
    #[error("File '{name}' is corrupt or not a valid document: {detail}")]
    CorruptFile { name: String, detail: String },

    /// The PDF is encrypted.
    #[error("PDF '{name}' is password protected")]
    PasswordProtected { name: String },

    /// The document parsed but holds no selectable text.
    #[error("No text could be extracted from '{name}'.\nIf it is a scanned PDF, use a document with selectable text.")]
    EmptyExtraction { name: String },

    /// Extracted text is too short to generate study material from.
    #[error("Only {chars} characters of text were extracted (minimum {min}). Check the file contains readable text.")]
    InsufficientText { chars: usize, min: usize },

    /// The pdfium library could not be located, downloaded or bound.
    #[error(
        "PDF engine unavailable: {0}\n\n\
PDFium is normally downloaded automatically on first use.\n\
If the download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    EngineUnavailable(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page object could not be loaded.
    #[error("Page {page}: could not be loaded: {detail}")]
    LoadFailed { page: usize, detail: String },

    /// The page loaded but its text layer could not be read.
    #[error("Page {page}: text extraction failed: {detail}")]
    TextFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::LoadFailed { page, .. } | PageError::TextFailed { page, .. } => *page,
        }
    }
}
