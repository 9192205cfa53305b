//! Chat-completion transport: one prompt in, one reply text out.
//!
//! Prompt text lives in [`crate::prompts`] and JSON recovery in
//! [`super::salvage`]; this module only moves bytes.
//!
//! Two backends implement [`ChatBackend`]:
//!
//! * [`HttpChatBackend`]: the built-in client. Sends exactly
//!   `{model, messages:[{role:"user",content}], temperature, max_tokens}` with
//!   a bearer token to an OpenAI-style endpoint and surfaces the HTTP status
//!   on failure.
//! * [`ProviderBackend`]: wraps any `edgequake_llm::LLMProvider`
//!   (OpenAI, Anthropic, Gemini, Ollama, ...).
//!
//! No backend retries. A failed call is reported to the caller immediately.

use crate::config::GenerationConfig;
use crate::error::SmartFlipError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Characters of an error body kept in [`SmartFlipError::Transport`].
const ERROR_BODY_CHARS: usize = 300;

/// Everything a backend needs to issue one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A chat-completion endpoint.
///
/// Object-safe so a pre-built backend can be injected through
/// [`GenerationConfig::backend`]; tests use this to run the whole
/// generation pipeline without a network.
pub trait ChatBackend: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Send the prompt and return the reply text (`choices[0].message.content`).
    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, SmartFlipError>>;
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequestBody<'a> {
    pub model: &'a str,
    pub messages: [WireMessage<'a>; 1],
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatRequestBody<'a> {
    pub(crate) fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: [WireMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseBody {
    pub choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireChoice {
    pub message: WireReply,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireReply {
    #[serde(default)]
    pub content: Option<String>,
}

/// Pull `choices[0].message.content` out of a response body.
pub(crate) fn reply_content(body: &str) -> Result<String, SmartFlipError> {
    let parsed: ChatResponseBody =
        serde_json::from_str(body).map_err(|e| SmartFlipError::InvalidCompletion {
            detail: e.to_string(),
        })?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| SmartFlipError::InvalidCompletion {
            detail: "response has no choices[0].message.content".into(),
        })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}\u{2026}", &text[..cut]),
        None => text.to_string(),
    }
}

// ── Built-in HTTP backend ────────────────────────────────────────────────

/// OpenAI-style chat-completion client over `reqwest`.
pub struct HttpChatBackend {
    client: reqwest::Client,
    url: String,
    api_key: String,
    timeout_secs: Option<u64>,
}

impl HttpChatBackend {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, SmartFlipError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SmartFlipError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
            timeout_secs,
        })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, SmartFlipError> {
        let start = Instant::now();
        let body = ChatRequestBody::from_request(request);
        debug!(
            "POST {} model={} max_tokens={} prompt={} chars",
            self.url,
            request.model,
            request.max_tokens,
            request.prompt.chars().count()
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(SmartFlipError::Transport {
                status: status.as_u16(),
                body: truncate(text.trim(), ERROR_BODY_CHARS),
            });
        }

        let content = reply_content(&text)?;
        info!(
            "Completion received: {} chars in {}ms",
            content.len(),
            start.elapsed().as_millis()
        );
        Ok(content)
    }

    fn map_send_error(&self, e: reqwest::Error) -> SmartFlipError {
        match self.timeout_secs {
            Some(secs) if e.is_timeout() => SmartFlipError::ApiTimeout { secs },
            _ => SmartFlipError::RequestFailed {
                reason: e.to_string(),
            },
        }
    }
}

impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, SmartFlipError>> {
        self.send(request).boxed()
    }
}

// ── edgequake-llm backend ────────────────────────────────────────────────

/// Adapter from any `edgequake_llm` provider to [`ChatBackend`].
pub struct ProviderBackend {
    name: String,
    provider: Arc<dyn LLMProvider>,
}

impl ProviderBackend {
    pub fn new(name: impl Into<String>, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }

    /// Instantiate a named provider (reads its API key from the environment).
    pub fn from_name(provider_name: &str, model: &str) -> Result<Self, SmartFlipError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            SmartFlipError::BackendNotConfigured {
                hint: format!("provider '{provider_name}' could not be created: {e}"),
            }
        })?;
        Ok(Self::new(provider_name, provider))
    }
}

impl ChatBackend for ProviderBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, SmartFlipError>> {
        async move {
            let messages = vec![ChatMessage::user(request.prompt.as_str())];
            let options = CompletionOptions {
                temperature: Some(request.temperature),
                max_tokens: Some(request.max_tokens as usize),
                ..Default::default()
            };
            let response = self
                .provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| SmartFlipError::Provider {
                    provider: self.name.clone(),
                    message: e.to_string(),
                })?;
            debug!(
                "Provider {}: {} input tokens, {} output tokens",
                self.name, response.prompt_tokens, response.completion_tokens
            );
            Ok(response.content)
        }
        .boxed()
    }
}

// ── Backend resolution ───────────────────────────────────────────────────

/// Resolve the chat backend, from most-specific to least-specific.
///
/// 1. **Injected backend** (`config.backend`), used as-is.
/// 2. **Named provider** (`config.provider_name`), built through
///    `edgequake-llm` with `config.model`.
/// 3. **API key**: `config.api_key`, then `SMARTFLIP_API_KEY`, then
///    `DEEPSEEK_API_KEY`, for the built-in [`HttpChatBackend`].
pub fn resolve_backend(config: &GenerationConfig) -> Result<Arc<dyn ChatBackend>, SmartFlipError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    if let Some(ref name) = config.provider_name {
        return Ok(Arc::new(ProviderBackend::from_name(name, &config.model)?));
    }

    let key = config
        .api_key
        .clone()
        .or_else(|| non_empty_env("SMARTFLIP_API_KEY"))
        .or_else(|| non_empty_env("DEEPSEEK_API_KEY"))
        .ok_or_else(|| SmartFlipError::BackendNotConfigured {
            hint: "Set SMARTFLIP_API_KEY or DEEPSEEK_API_KEY, pass --api-key, \
                   or choose a provider with --provider."
                .into(),
        })?;

    Ok(Arc::new(HttpChatBackend::new(
        config.api_url.clone(),
        key,
        config.request_timeout_secs,
    )?))
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
