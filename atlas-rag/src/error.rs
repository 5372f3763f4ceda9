//! Error types for the `atlas-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval and answer generation.
///
/// Degraded-but-successful outcomes (a failed rerank, an index that was never
/// built) are not errors at the pipeline level; they are reported through
/// [`RetrievalWarning`](crate::RetrievalWarning) instead.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid chunk size, overlap, `top_k` or another setup parameter.
    ///
    /// Raised before any model or index I/O takes place.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The embedding model failed or returned malformed output.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding model that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index rejected an operation.
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// A search was attempted before any successful build.
    #[error("Vector index unavailable: no documents have been processed")]
    IndexUnavailable,

    /// The cross-encoder failed or returned malformed output.
    #[error("Reranker error ({reranker}): {message}")]
    Reranker {
        /// The cross-encoder that produced the error.
        reranker: String,
        /// A description of the failure.
        message: String,
    },

    /// The completion API failed or returned an unusable response.
    #[error("Completion error ({provider}): {message}")]
    Completion {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl RagError {
    /// Returns `true` for errors that must be shown to the user as hard
    /// setup failures rather than folded into a "cannot answer" response.
    pub fn is_configuration(&self) -> bool {
        matches!(self, RagError::Configuration(_))
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
