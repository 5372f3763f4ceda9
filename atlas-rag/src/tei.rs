//! Cross-encoder client for text-embeddings-inference `/rerank` endpoints.
//!
//! This module is only available when the `tei` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::reranker::CrossEncoder;

/// The cross-encoder the default deployment serves.
pub const DEFAULT_MODEL: &str = "ms-marco-MiniLM-L-12-v2";

/// A [`CrossEncoder`] backed by a text-embeddings-inference rerank server.
///
/// Each call sends the query and all candidate passages in one request and
/// maps the returned `(index, score)` pairs back to input order.
///
/// # Example
///
/// ```rust,ignore
/// use atlas_rag::tei::TeiCrossEncoder;
///
/// let encoder = TeiCrossEncoder::new("http://localhost:8081")?;
/// let score = encoder.score("KDV oranı nedir?", "KDV oranı %20'dir.").await?;
/// ```
pub struct TeiCrossEncoder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl TeiCrossEncoder {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = base_url.as_ref().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(RagError::Configuration("reranker base URL must not be empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: format!("{base_url}/rerank"),
            model: DEFAULT_MODEL.into(),
        })
    }

    /// Set the model name reported in logs.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn error(&self, message: impl Into<String>) -> RagError {
        RagError::Reranker { reranker: self.model.clone(), message: message.into() }
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [&'a str],
    raw_scores: bool,
}

#[derive(Deserialize)]
struct RankedText {
    index: usize,
    score: f32,
}

#[async_trait]
impl CrossEncoder for TeiCrossEncoder {
    async fn score(&self, query: &str, passage: &str) -> Result<f32> {
        let scores = self.score_batch(query, &[passage]).await?;
        scores.into_iter().next().ok_or_else(|| self.error("server returned no score"))
    }

    async fn score_batch(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }
        debug!(reranker = %self.model, batch_size = passages.len(), "scoring passages");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&RerankRequest { query, texts: passages, raw_scores: false })
            .send()
            .await
            .map_err(|e| {
                error!(reranker = %self.model, error = %e, "request failed");
                self.error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(reranker = %self.model, %status, "API error");
            return Err(self.error(format!("API returned {status}: {body}")));
        }

        let ranked: Vec<RankedText> = response.json().await.map_err(|e| {
            error!(reranker = %self.model, error = %e, "failed to parse response");
            self.error(format!("failed to parse response: {e}"))
        })?;

        let mut scores = vec![None; passages.len()];
        for item in ranked {
            let slot = scores
                .get_mut(item.index)
                .ok_or_else(|| self.error(format!("server returned unknown index {}", item.index)))?;
            *slot = Some(item.score);
        }
        scores
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.ok_or_else(|| self.error(format!("no score for passage {i}"))))
            .collect()
    }

    fn name(&self) -> &str {
        &self.model
    }
}
