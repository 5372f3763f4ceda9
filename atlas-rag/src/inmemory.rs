//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryVectorIndex`] keeps an immutable snapshot of the entries behind a
//! `tokio::sync::RwLock`. A build prepares the new snapshot outside the lock
//! and swaps it in with one write, so readers only ever see a complete index.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{CandidateSet, IndexEntry, SearchResult};
use crate::error::{RagError, Result};
use crate::index::{IndexStats, VectorIndex};

#[derive(Debug)]
struct Snapshot {
    entries: Vec<IndexEntry>,
    norms: Vec<f32>,
    stats: IndexStats,
}

/// An in-memory [`VectorIndex`] with exhaustive cosine similarity search.
///
/// Suitable for the per-session corpora this crate targets (a handful of
/// uploaded documents, a few thousand chunks).
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl InMemoryVectorIndex {
    /// Create a new, unbuilt index.
    pub fn new() -> Self {
        Self::default()
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity given precomputed norms. Returns 0.0 if either vector
/// has zero magnitude.
fn cosine_similarity(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn build(&self, entries: Vec<IndexEntry>) -> Result<IndexStats> {
        let dimensions = entries.first().map(|e| e.embedding.len()).unwrap_or(0);
        if !entries.is_empty() && dimensions == 0 {
            return Err(RagError::VectorIndex("entries have empty embeddings".into()));
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(RagError::VectorIndex(format!(
                "chunk '{}' has {} dimensions, expected {dimensions}",
                bad.chunk.id,
                bad.embedding.len()
            )));
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.iter().any(|x| !x.is_finite())) {
            return Err(RagError::VectorIndex(format!(
                "chunk '{}' has non-finite embedding values",
                bad.chunk.id
            )));
        }

        let documents: HashSet<&str> = entries.iter().map(|e| e.chunk.source.as_str()).collect();
        let stats = IndexStats { entries: entries.len(), documents: documents.len(), dimensions };
        let norms = entries.iter().map(|e| l2_norm(&e.embedding)).collect();
        let snapshot = Arc::new(Snapshot { entries, norms, stats });

        *self.snapshot.write().await = Some(snapshot);
        info!(entries = stats.entries, documents = stats.documents, dimensions, "index built");
        Ok(stats)
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<CandidateSet> {
        if top_k == 0 {
            return Err(RagError::Configuration("top_k must be greater than zero".into()));
        }
        let snapshot = self.snapshot.read().await.clone().ok_or(RagError::IndexUnavailable)?;
        if snapshot.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != snapshot.stats.dimensions {
            return Err(RagError::VectorIndex(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                snapshot.stats.dimensions
            )));
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(RagError::VectorIndex("query has non-finite values".into()));
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<(usize, f32)> = snapshot
            .entries
            .iter()
            .zip(&snapshot.norms)
            .enumerate()
            .map(|(position, (entry, norm))| {
                (position, cosine_similarity(&entry.embedding, *norm, query, query_norm))
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(top_k);
        debug!(top_k, returned = scored.len(), "index search");

        Ok(scored
            .into_iter()
            .map(|(position, score)| SearchResult {
                chunk: snapshot.entries[position].chunk.clone(),
                score,
            })
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        *self.snapshot.write().await = None;
        info!("index cleared");
        Ok(())
    }

    async fn stats(&self) -> Option<IndexStats> {
        self.snapshot.read().await.as_ref().map(|s| s.stats)
    }
}
