//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the retrieval pipeline.
///
/// Construct through [`RagConfig::builder()`] to get validation; invalid
/// combinations are rejected before any model is called.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks sent to the embedding model per call.
    pub embedding_batch_size: usize,
    /// Number of candidates returned by the vector search stage.
    pub top_k: usize,
    /// Whether queries are reranked unless the caller says otherwise.
    pub use_reranking: bool,
    /// Maximum number of ranked chunks placed in the grounded context.
    pub context_chunks: usize,
    /// Maximum combined length, in characters, of the grounded context.
    pub max_context_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            embedding_batch_size: 32,
            top_k: 25,
            use_reranking: true,
            context_chunks: 5,
            max_context_chars: 6000,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if:
    /// - `chunk_size == 0` or `chunk_overlap >= chunk_size`
    /// - `embedding_batch_size == 0`
    /// - `top_k == 0`
    /// - `context_chunks == 0` or `max_context_chars == 0`
    /// - `max_context_chars < chunk_size`, which could leave no chunk that fits
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Configuration("chunk_size must be greater than zero".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.embedding_batch_size == 0 {
            return Err(RagError::Configuration(
                "embedding_batch_size must be greater than zero".into(),
            ));
        }
        if self.top_k == 0 {
            return Err(RagError::Configuration("top_k must be greater than zero".into()));
        }
        if self.context_chunks == 0 {
            return Err(RagError::Configuration("context_chunks must be greater than zero".into()));
        }
        if self.max_context_chars == 0 {
            return Err(RagError::Configuration(
                "max_context_chars must be greater than zero".into(),
            ));
        }
        if self.max_context_chars < self.chunk_size {
            return Err(RagError::Configuration(format!(
                "max_context_chars ({}) must be at least chunk_size ({})",
                self.max_context_chars, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set how many chunks are embedded per model call.
    pub fn embedding_batch_size(mut self, size: usize) -> Self {
        self.config.embedding_batch_size = size;
        self
    }

    /// Set the number of vector search candidates.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the default reranking toggle.
    pub fn use_reranking(mut self, enabled: bool) -> Self {
        self.config.use_reranking = enabled;
        self
    }

    /// Set the maximum number of chunks in the grounded context.
    pub fn context_chunks(mut self, n: usize) -> Self {
        self.config.context_chunks = n;
        self
    }

    /// Set the character budget of the grounded context.
    pub fn max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(RagConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_overlap_at_least_chunk_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(err.to_string().contains("chunk_overlap (100)"));
    }

    #[test]
    fn rejects_zero_values() {
        assert!(RagConfig::builder().top_k(0).build().is_err());
        assert!(RagConfig::builder().embedding_batch_size(0).build().is_err());
        assert!(RagConfig::builder().context_chunks(0).build().is_err());
        assert!(RagConfig::builder().max_context_chars(0).build().is_err());
        assert!(RagConfig::builder().chunk_size(0).chunk_overlap(0).build().is_err());
    }

    #[test]
    fn rejects_context_budget_smaller_than_a_chunk() {
        let result = RagConfig::builder().chunk_size(800).max_context_chars(500).build();
        assert!(matches!(result, Err(RagError::Configuration(_))));
    }

    #[test]
    fn missing_fields_take_defaults_when_deserialized() {
        let config: RagConfig = serde_json::from_str(r#"{"top_k": 10}"#).unwrap();
        assert_eq!(config.top_k, 10);
        assert_eq!(config.chunk_size, 1000);
        assert!(config.use_reranking);
    }
}
