//! Configuration types for generation and extraction.
//!
//! Generation is controlled through [`GenerationConfig`] and extraction
//! through [`ExtractionConfig`], each built via its builder. The two are kept
//! apart because the components they drive never share state: a caller that
//! only parses uploads never needs an API key.

use crate::artifact::{ArtifactKind, ValidationPolicy};
use crate::error::SmartFlipError;
use crate::pipeline::request::ChatBackend;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Default chat-completion endpoint.
pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";

/// Default model identifier sent in every request.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Accepted upload MIME types.
pub const ACCEPTED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "text/plain",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

// ── Generation ───────────────────────────────────────────────────────────

/// Configuration for a generation request.
///
/// # Example
/// ```rust
/// use smartflip::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .api_key("sk-test")
///     .temperature(0.5)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "deepseek-chat");
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Chat-completion endpoint. Default: [`DEFAULT_API_URL`].
    pub api_url: String,

    /// Bearer token. If None, `SMARTFLIP_API_KEY` then `DEEPSEEK_API_KEY` are read.
    pub api_key: Option<String>,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature. Range 0.0–2.0. Default: 0.7.
    pub temperature: f32,

    /// Response-size ceiling. If None, chosen per kind (2000 / 3000 / 4000).
    pub max_tokens: Option<u32>,

    /// Optional per-request timeout in seconds. Default: None (transport default).
    pub request_timeout_secs: Option<u64>,

    /// Artifact validation. Default: [`ValidationPolicy::Strict`].
    pub validation: ValidationPolicy,

    /// `edgequake-llm` provider name (e.g. "openai", "anthropic", "ollama").
    /// Takes precedence over the built-in HTTP backend.
    pub provider_name: Option<String>,

    /// Pre-constructed backend. Takes precedence over everything else.
    pub backend: Option<Arc<dyn ChatBackend>>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: None,
            request_timeout_secs: None,
            validation: ValidationPolicy::default(),
            provider_name: None,
            backend: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("validation", &self.validation)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    /// The `max_tokens` value for a request of the given kind.
    pub fn max_tokens_for(&self, kind: ArtifactKind) -> u32 {
        self.max_tokens.unwrap_or_else(|| kind.max_tokens())
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn validation(mut self, policy: ValidationPolicy) -> Self {
        self.config.validation = policy;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, SmartFlipError> {
        let c = &self.config;
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(SmartFlipError::InvalidConfig(format!(
                "temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if c.max_tokens == Some(0) {
            return Err(SmartFlipError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(SmartFlipError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if !c.api_url.starts_with("http://") && !c.api_url.starts_with("https://") {
            return Err(SmartFlipError::InvalidConfig(format!(
                "api_url must be an HTTP/HTTPS URL, got '{}'",
                c.api_url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(SmartFlipError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}

// ── Extraction ───────────────────────────────────────────────────────────

/// Configuration for document text extraction.
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Hard cap on PDF pages read. Default: 100.
    ///
    /// Bounds latency and peak memory on book-length uploads; a note saying
    /// how many pages were read is appended when the cap applies.
    pub max_pages: usize,

    /// Timeout for opening a PDF, in seconds. Default: 30.
    pub load_timeout_secs: u64,

    /// Largest accepted upload in bytes. Default: 10 MiB.
    pub max_upload_bytes: u64,

    /// Minimum trimmed character count for text to be worth generating from. Default: 50.
    pub min_text_chars: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            load_timeout_secs: 30,
            max_upload_bytes: 10 * 1024 * 1024,
            min_text_chars: 50,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("max_pages", &self.max_pages)
            .field("load_timeout_secs", &self.load_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("min_text_chars", &self.min_text_chars)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n;
        self
    }

    pub fn load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.load_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, n: u64) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, SmartFlipError> {
        let c = &self.config;
        if c.max_pages == 0 {
            return Err(SmartFlipError::InvalidConfig("max_pages must be ≥ 1".into()));
        }
        if c.load_timeout_secs == 0 {
            return Err(SmartFlipError::InvalidConfig(
                "load timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(SmartFlipError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
