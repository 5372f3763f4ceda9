//! Embedding model client for OpenAI-compatible `/embeddings` endpoints.
//!
//! Works with OpenAI itself and with self-hosted servers that expose the same
//! API, such as text-embeddings-inference serving
//! `intfloat/multilingual-e5-small`.
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingModel;
use crate::error::{RagError, Result};

/// The default model: multilingual E5, trained with `passage:`/`query:` prefixes.
pub const DEFAULT_MODEL: &str = "intfloat/multilingual-e5-small";

/// Output dimensionality of `multilingual-e5-small`.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Input limit, in characters, assumed for the default model (512 tokens).
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2000;

const PROVIDER: &str = "OpenAI-compatible";

/// An [`EmbeddingModel`] backed by an OpenAI-compatible embeddings API.
///
/// # Configuration
///
/// - `base_url` – API root, e.g. `http://localhost:8080/v1`; `/embeddings` is appended.
/// - `api_key` – optional bearer token.
/// - `model` – defaults to [`DEFAULT_MODEL`].
/// - `dimensions` – expected vector length, defaults to [`DEFAULT_DIMENSIONS`].
///
/// # Example
///
/// ```rust,ignore
/// use atlas_rag::openai::OpenAIEmbeddingModel;
///
/// let model = OpenAIEmbeddingModel::new("http://localhost:8080/v1")?
///     .with_api_key(std::env::var("EMBEDDING_API_KEY")?);
/// ```
pub struct OpenAIEmbeddingModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
    max_input_chars: Option<usize>,
}

impl OpenAIEmbeddingModel {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = base_url.as_ref().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(RagError::Configuration("embedding base URL must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: format!("{base_url}/embeddings"),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            max_input_chars: Some(DEFAULT_MAX_INPUT_CHARS),
        })
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then_some(api_key);
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the expected output dimensionality.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    /// Set the input limit in characters, or `None` to disable the check.
    pub fn with_max_input_chars(mut self, limit: Option<usize>) -> Self {
        self.max_input_chars = limit;
        self
    }

    fn error(message: impl Into<String>) -> RagError {
        RagError::Embedding { provider: PROVIDER.into(), message: message.into() }
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── EmbeddingModel implementation ──────────────────────────────────

#[async_trait]
impl EmbeddingModel for OpenAIEmbeddingModel {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = inputs.len(), model = %self.model, "embedding batch");

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest { model: &self.model, input: inputs });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "request failed");
            Self::error(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(Self::error(format!("API returned {status}: {detail}")));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            Self::error(format!("failed to parse response: {e}"))
        })?;

        // The API may return items out of order; `index` restores input order.
        parsed.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn max_input_chars(&self) -> Option<usize> {
        self.max_input_chars
    }

    fn name(&self) -> &str {
        &self.model
    }
}
