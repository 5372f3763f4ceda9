//! Chat completion client for OpenAI-compatible APIs, with Groq presets.
//!
//! This module is only available when the `groq` feature is enabled.
//!
//! # Supported Models
//!
//! | Model | Description |
//! |-------|-------------|
//! | `llama-3.3-70b-versatile` | Default, most accurate |
//! | `llama-3.1-8b-instant` | Fast, lower cost |

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::{Completer, PromptPayload};
use crate::error::{RagError, Result};

/// Groq's OpenAI-compatible API root.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Sampling temperature used for grounded answers.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Upper bound on answer length.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Completion models offered for selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroqModel {
    /// `llama-3.3-70b-versatile`
    #[default]
    Llama33_70bVersatile,
    /// `llama-3.1-8b-instant`
    Llama31_8bInstant,
}

impl GroqModel {
    /// Every selectable model, default first.
    pub const ALL: [GroqModel; 2] = [GroqModel::Llama33_70bVersatile, GroqModel::Llama31_8bInstant];

    /// API model identifier.
    pub fn id(self) -> &'static str {
        match self {
            GroqModel::Llama33_70bVersatile => "llama-3.3-70b-versatile",
            GroqModel::Llama31_8bInstant => "llama-3.1-8b-instant",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            GroqModel::Llama33_70bVersatile => "Llama 3.3 70B",
            GroqModel::Llama31_8bInstant => "Llama 3.1 8B",
        }
    }

    /// Look a model up by display name, falling back to the default.
    pub fn from_display_name(name: &str) -> Self {
        Self::ALL.into_iter().find(|m| m.display_name() == name).unwrap_or_default()
    }
}

impl fmt::Display for GroqModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GroqModel {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|m| m.id() == s || m.display_name() == s).ok_or_else(|| {
            RagError::Configuration(format!(
                "unknown model '{s}', expected one of: {}",
                Self::ALL.map(GroqModel::id).join(", ")
            ))
        })
    }
}

/// A [`Completer`] for any OpenAI-compatible chat completions endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use atlas_rag::groq::{GroqModel, OpenAICompatibleCompleter};
///
/// let completer = OpenAICompatibleCompleter::groq(api_key, GroqModel::Llama31_8bInstant)?;
/// ```
pub struct OpenAICompatibleCompleter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAICompatibleCompleter {
    /// Create a client for `model` on the API rooted at `base_url`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Configuration("completion API key must not be empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", base_url.as_ref().trim_end_matches('/')),
            api_key,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Create a Groq client.
    pub fn groq(api_key: impl Into<String>, model: GroqModel) -> Result<Self> {
        Self::new(api_key, GROQ_API_BASE, model.id())
    }

    /// Create a Groq client using the `GROQ_API_KEY` environment variable.
    pub fn groq_from_env(model: GroqModel) -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            RagError::Configuration("GROQ_API_KEY environment variable not set".into())
        })?;
        Self::groq(api_key, model)
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn error(&self, message: impl Into<String>) -> RagError {
        RagError::Completion { provider: self.model.clone(), message: message.into() }
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl Completer for OpenAICompatibleCompleter {
    async fn complete(&self, prompt: &PromptPayload) -> Result<String> {
        let user_message = prompt.user_message();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &prompt.system_instruction },
                ChatMessage { role: "user", content: &user_message },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(model = %self.model, prompt_chars = user_message.len(), "requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "request failed");
                self.error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
            error!(model = %self.model, %status, "API error");
            return Err(self.error(format!("API returned {status}: {detail}")));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(model = %self.model, error = %e, "failed to parse response");
            self.error(format!("failed to parse response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.error("response contained no message content"))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
