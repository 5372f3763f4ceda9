//! Cross-encoder reranking of first-stage candidates.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::document::{CandidateSet, RankedResult, RerankedSet};
use crate::error::{RagError, Result};

/// A model that jointly scores a (query, passage) pair.
///
/// Higher scores mean more relevant. No range is assumed; scores only need
/// to be comparable with each other.
#[async_trait]
pub trait CrossEncoder: Send + Sync {
    /// Score a single passage against the query.
    async fn score(&self, query: &str, passage: &str) -> Result<f32>;

    /// Score several passages against the same query, one score per passage.
    ///
    /// The default implementation calls [`score`](CrossEncoder::score)
    /// sequentially. Override it if the backend scores batches natively.
    async fn score_batch(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        let mut scores = Vec::with_capacity(passages.len());
        for passage in passages {
            scores.push(self.score(query, passage).await?);
        }
        Ok(scores)
    }

    /// A short name used in logs and error messages.
    fn name(&self) -> &str;
}

/// Reorders a [`CandidateSet`] by cross-encoder relevance.
///
/// The sort is stable: candidates with equal scores keep their first-stage
/// order.
///
/// # Example
///
/// ```rust,ignore
/// use atlas_rag::Reranker;
///
/// let reranker = Reranker::new(Arc::new(my_cross_encoder));
/// let reranked = reranker.rerank("KDV oranı nedir?", candidates).await?;
/// ```
#[derive(Clone)]
pub struct Reranker {
    encoder: Arc<dyn CrossEncoder>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker").field("encoder", &self.encoder.name()).finish()
    }
}

impl Reranker {
    /// Wrap a cross-encoder.
    pub fn new(encoder: Arc<dyn CrossEncoder>) -> Self {
        Self { encoder }
    }

    /// Name of the wrapped cross-encoder.
    pub fn name(&self) -> &str {
        self.encoder.name()
    }

    /// Score every candidate against `query` and sort by descending score.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Reranker`] if the model call fails or returns a
    /// different number of scores than candidates.
    pub async fn rerank(&self, query: &str, candidates: CandidateSet) -> Result<RerankedSet> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let passages: Vec<&str> = candidates.iter().map(|c| c.chunk.text.as_str()).collect();
        let scores = self.encoder.score_batch(query, &passages).await.map_err(|e| match e {
            RagError::Reranker { .. } => e,
            other => self.error(other.to_string()),
        })?;
        if scores.len() != candidates.len() {
            return Err(self.error(format!(
                "expected {} scores, model returned {}",
                candidates.len(),
                scores.len()
            )));
        }
        if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
            return Err(self.error(format!("model returned non-finite score {bad}")));
        }

        let mut reranked: RerankedSet = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, score)| RankedResult {
                similarity: candidate.score,
                score,
                chunk: candidate.chunk,
            })
            .collect();
        // `sort_by` is stable, so ties keep candidate order.
        reranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(reranker = self.encoder.name(), count = reranked.len(), "reranked candidates");
        Ok(reranked)
    }

    fn error(&self, message: impl Into<String>) -> RagError {
        RagError::Reranker { reranker: self.encoder.name().to_string(), message: message.into() }
    }
}

/// Convert candidates to a reranked set without rescoring.
pub fn pass_through(candidates: CandidateSet) -> RerankedSet {
    candidates.into_iter().map(RankedResult::from).collect()
}
