//! Vector index trait for storing chunk embeddings and searching them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{CandidateSet, IndexEntry};
use crate::error::Result;

/// Size information about the current index contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of indexed chunks.
    pub entries: usize,
    /// Number of distinct source documents.
    pub documents: usize,
    /// Vector dimensionality, zero for an empty index.
    pub dimensions: usize,
}

/// Storage for one session's chunk embeddings with similarity search.
///
/// An index starts out unbuilt. [`build`](VectorIndex::build) replaces the
/// whole contents at once: on success the new entries become visible to
/// every subsequent search, on failure the previous contents are kept.
///
/// # Example
///
/// ```rust,ignore
/// use atlas_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.build(entries).await?;
/// let candidates = index.search(&query_vector, 25).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replace the index contents with `entries`.
    ///
    /// Entry order defines the tie-break order of [`search`](VectorIndex::search).
    async fn build(&self, entries: Vec<IndexEntry>) -> Result<IndexStats>;

    /// Return the `top_k` most similar entries by descending score.
    ///
    /// Ties are broken by build order. Asking for more entries than the index
    /// holds returns all of them. Searching an index that was never built
    /// fails with [`RagError::IndexUnavailable`](crate::RagError::IndexUnavailable).
    async fn search(&self, query: &[f32], top_k: usize) -> Result<CandidateSet>;

    /// Drop all entries and return to the unbuilt state.
    async fn clear(&self) -> Result<()>;

    /// Statistics for the current contents, or `None` if unbuilt.
    async fn stats(&self) -> Option<IndexStats>;

    /// Number of indexed chunks, zero if unbuilt.
    async fn len(&self) -> usize {
        self.stats().await.map_or(0, |s| s.entries)
    }

    /// Returns `true` once a build has succeeded and until [`clear`](VectorIndex::clear).
    async fn is_built(&self) -> bool {
        self.stats().await.is_some()
    }
}
