//! Embedding model trait and the prefixing [`Embedder`].
//!
//! Multilingual E5 style models are trained asymmetrically: passages must be
//! embedded as `"passage: <text>"` and queries as `"query: <text>"`. Getting
//! this wrong degrades ranking without any visible error, so callers never
//! talk to an [`EmbeddingModel`] directly. They go through
//! [`Embedder::embed_documents`] and [`Embedder::embed_query`], which apply
//! the right prefix.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::document::Chunk;
use crate::error::{RagError, Result};

/// Prefix applied to every document chunk before embedding.
pub const PASSAGE_PREFIX: &str = "passage: ";

/// Prefix applied to every query before embedding.
pub const QUERY_PREFIX: &str = "query: ";

/// A backend that turns a batch of already-prefixed strings into vectors.
///
/// Implementations must return exactly one vector per input, in input order,
/// each of [`dimensions`](EmbeddingModel::dimensions) length.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed a batch of inputs.
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimensionality of the vectors this model produces.
    fn dimensions(&self) -> usize;

    /// Longest input, in characters, the model accepts without truncation.
    ///
    /// `None` means the backend does not report a limit.
    fn max_input_chars(&self) -> Option<usize> {
        None
    }

    /// A short name used in logs and error messages.
    fn name(&self) -> &str;
}

/// Typed entry point to an [`EmbeddingModel`] that owns the prefix contract.
#[derive(Clone)]
pub struct Embedder {
    model: Arc<dyn EmbeddingModel>,
    batch_size: usize,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model", &self.model.name())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Embedder {
    /// Wrap a model, sending document chunks in batches of `batch_size`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if `batch_size` is zero.
    pub fn new(model: Arc<dyn EmbeddingModel>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(RagError::Configuration(
                "embedding_batch_size must be greater than zero".into(),
            ));
        }
        Ok(Self { model, batch_size })
    }

    /// The wrapped model.
    pub fn model(&self) -> &Arc<dyn EmbeddingModel> {
        &self.model
    }

    /// Vector dimensionality of the wrapped model.
    pub fn dimensions(&self) -> usize {
        self.model.dimensions()
    }

    /// Embed document chunks, one vector per chunk in chunk order.
    pub async fn embed_documents(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let inputs: Vec<String> =
                batch.iter().map(|c| format!("{PASSAGE_PREFIX}{}", c.text)).collect();
            vectors.extend(self.call(&inputs).await?);
        }
        Ok(vectors)
    }

    /// Embed a user query.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let inputs = [format!("{QUERY_PREFIX}{text}")];
        let mut vectors = self.call(&inputs).await?;
        vectors.pop().ok_or_else(|| self.error("model returned no vector for query"))
    }

    async fn call(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if let Some(limit) = self.model.max_input_chars() {
            if let Some(len) = inputs.iter().map(|s| s.chars().count()).find(|len| *len > limit) {
                return Err(RagError::Configuration(format!(
                    "embedding input of {len} characters exceeds the {limit}-character limit of '{}'",
                    self.model.name()
                )));
            }
        }

        debug!(model = self.model.name(), batch = inputs.len(), "embedding batch");
        let vectors = self.model.embed_batch(inputs).await.map_err(|e| {
            error!(model = self.model.name(), error = %e, "embedding call failed");
            match e {
                RagError::Embedding { .. } => e,
                other => self.error(other.to_string()),
            }
        })?;

        if vectors.len() != inputs.len() {
            return Err(self.error(format!(
                "expected {} vectors, model returned {}",
                inputs.len(),
                vectors.len()
            )));
        }
        let expected = self.model.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(self.error(format!(
                "expected {expected}-dimensional vectors, model returned {}",
                bad.len()
            )));
        }
        if vectors.iter().flatten().any(|x| !x.is_finite()) {
            return Err(self.error("model returned non-finite values"));
        }
        Ok(vectors)
    }

    fn error(&self, message: impl Into<String>) -> RagError {
        RagError::Embedding { provider: self.model.name().to_string(), message: message.into() }
    }
}
