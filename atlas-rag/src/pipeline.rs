//! Retrieval pipeline orchestrator.
//!
//! The [`RetrievalPipeline`] runs the build-time workflow
//! (chunk → embed → index) and the query-time workflow
//! (embed → search → rerank → context window).
//!
//! # Example
//!
//! ```rust,ignore
//! use atlas_rag::{RagConfig, RetrievalPipeline};
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_model(Arc::new(my_embedder))
//!     .cross_encoder(Arc::new(my_cross_encoder))
//!     .build()?;
//!
//! pipeline.process(&documents).await?;
//! let retrieval = pipeline.retrieve("KDV oranı nedir?", 25, true).await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::context::GroundedContext;
use crate::document::{Chunk, Document, IndexEntry};
use crate::embedding::{Embedder, EmbeddingModel, PASSAGE_PREFIX};
use crate::error::{RagError, Result};
use crate::index::{IndexStats, VectorIndex};
use crate::inmemory::InMemoryVectorIndex;
use crate::reranker::{CrossEncoder, Reranker, pass_through};

/// Summary of a successful index build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Number of input documents.
    pub documents: usize,
    /// Number of chunks indexed.
    pub chunks: usize,
    /// Vector dimensionality, zero when nothing was indexed.
    pub dimensions: usize,
}

/// A non-fatal condition encountered while retrieving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetrievalWarning {
    /// No documents have been processed yet.
    IndexUnavailable,
    /// The query could not be embedded.
    QueryEmbeddingFailed(String),
    /// The vector search failed.
    SearchFailed(String),
    /// Reranking was requested but could not be applied; candidates are in
    /// vector similarity order.
    RerankDegraded(String),
}

/// Whether retrieval found anything to ground an answer on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Evidence {
    /// A non-empty grounded context.
    Found(GroundedContext),
    /// Nothing relevant was retrieved; the caller should not prompt a model.
    NotFound,
}

/// The outcome of [`RetrievalPipeline::retrieve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    /// The grounded context, or the explicit absence of one.
    pub evidence: Evidence,
    /// Number of first-stage candidates.
    pub candidate_count: usize,
    /// Whether the cross-encoder ordering was applied.
    pub reranked: bool,
    /// Degradations encountered along the way.
    pub warnings: Vec<RetrievalWarning>,
}

impl Retrieval {
    fn not_found(warnings: Vec<RetrievalWarning>) -> Self {
        Self { evidence: Evidence::NotFound, candidate_count: 0, reranked: false, warnings }
    }

    /// The grounded context, if any evidence was found.
    pub fn context(&self) -> Option<&GroundedContext> {
        match &self.evidence {
            Evidence::Found(context) => Some(context),
            Evidence::NotFound => None,
        }
    }

    /// Returns `true` if retrieval found evidence.
    pub fn has_evidence(&self) -> bool {
        matches!(self.evidence, Evidence::Found(_))
    }

    /// Returns `true` if reranking was requested but fell back to vector order.
    pub fn is_rerank_degraded(&self) -> bool {
        self.warnings.iter().any(|w| matches!(w, RetrievalWarning::RerankDegraded(_)))
    }
}

/// The retrieval pipeline orchestrator.
///
/// One pipeline owns one session's index. Builds are serialised and replace
/// the index only when every stage succeeded; searches may run concurrently.
/// Construct one via [`RetrievalPipeline::builder()`].
pub struct RetrievalPipeline {
    config: RagConfig,
    chunker: Chunker,
    embedder: Embedder,
    reranker: Option<Reranker>,
    index: Arc<dyn VectorIndex>,
    build_lock: Mutex<()>,
}

impl std::fmt::Debug for RetrievalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalPipeline")
            .field("config", &self.config)
            .field("embedder", &self.embedder)
            .field("reranker", &self.reranker)
            .finish_non_exhaustive()
    }
}

impl RetrievalPipeline {
    /// Create a new [`RetrievalPipelineBuilder`].
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedder.
    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Returns `true` if a cross-encoder is configured.
    pub fn has_reranker(&self) -> bool {
        self.reranker.is_some()
    }

    /// Build the index from `documents` with the configured chunking.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage. The previous index, if
    /// any, is left untouched.
    pub async fn process(&self, documents: &[Document]) -> Result<BuildReport> {
        self.build_index(documents, self.chunker).await
    }

    /// Build the index from `documents` with explicit chunking parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] before any model call if the
    /// parameters are invalid or produce chunks the embedding model cannot
    /// accept; otherwise as [`process`](Self::process).
    pub async fn process_with_chunking(
        &self,
        documents: &[Document],
        chunk_size: usize,
        overlap: usize,
    ) -> Result<BuildReport> {
        let chunker = Chunker::new(chunk_size, overlap)?;
        check_input_limit(self.embedder.model().as_ref(), chunk_size)?;
        if chunk_size > self.config.max_context_chars {
            return Err(RagError::Configuration(format!(
                "chunk_size ({chunk_size}) exceeds max_context_chars ({})",
                self.config.max_context_chars
            )));
        }
        self.build_index(documents, chunker).await
    }

    async fn build_index(&self, documents: &[Document], chunker: Chunker) -> Result<BuildReport> {
        let _guard = self.build_lock.lock().await;

        // 1. Chunk every document before touching any model
        let chunks: Vec<Chunk> = documents.iter().flat_map(|d| chunker.chunk(d)).collect();

        // 2. Embed all chunks
        let embeddings = self.embedder.embed_documents(&chunks).await.map_err(|e| {
            error!(chunk_count = chunks.len(), error = %e, "embedding failed during build");
            e
        })?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::Pipeline(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        // 3. Replace the index in one step
        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();
        let stats = self.index.build(entries).await.map_err(|e| {
            error!(error = %e, "index build failed");
            e
        })?;

        info!(documents = documents.len(), chunk_count = stats.entries, "processed documents");
        Ok(BuildReport {
            documents: documents.len(),
            chunks: stats.entries,
            dimensions: stats.dimensions,
        })
    }

    /// Retrieve with the configured `top_k` and reranking default.
    pub async fn retrieve_default(&self, query: &str) -> Result<Retrieval> {
        self.retrieve(query, self.config.top_k, self.config.use_reranking).await
    }

    /// Query the pipeline: embed → search → rerank → select context.
    ///
    /// Model and index failures do not fail the call; they produce
    /// [`Evidence::NotFound`] (or an unranked context) plus a
    /// [`RetrievalWarning`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if `top_k` is zero.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        use_reranking: bool,
    ) -> Result<Retrieval> {
        if top_k == 0 {
            return Err(RagError::Configuration("top_k must be greater than zero".into()));
        }

        // 1. Embed the query
        let query_vector = match self.embedder.embed_query(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "query embedding failed");
                let warning = RetrievalWarning::QueryEmbeddingFailed(e.to_string());
                return Ok(Retrieval::not_found(vec![warning]));
            }
        };

        // 2. Search the index
        let candidates = match self.index.search(&query_vector, top_k).await {
            Ok(candidates) => candidates,
            Err(RagError::IndexUnavailable) => {
                info!("query before any documents were processed");
                return Ok(Retrieval::not_found(vec![RetrievalWarning::IndexUnavailable]));
            }
            Err(e) => {
                warn!(error = %e, "vector search failed");
                return Ok(Retrieval::not_found(vec![RetrievalWarning::SearchFailed(
                    e.to_string(),
                )]));
            }
        };
        let candidate_count = candidates.len();

        // 3. Rerank if requested
        let mut warnings = Vec::new();
        let mut reranked = false;
        let ranked = match (&self.reranker, use_reranking && !candidates.is_empty()) {
            (Some(reranker), true) => match reranker.rerank(query, candidates.clone()).await {
                Ok(ranked) => {
                    reranked = true;
                    ranked
                }
                Err(e) => {
                    warn!(reranker = reranker.name(), error = %e, "reranking degraded");
                    warnings.push(RetrievalWarning::RerankDegraded(e.to_string()));
                    pass_through(candidates)
                }
            },
            (None, true) => {
                warnings.push(RetrievalWarning::RerankDegraded(
                    "no cross-encoder configured".to_string(),
                ));
                pass_through(candidates)
            }
            (_, false) => pass_through(candidates),
        };

        // 4. Select the context window
        let context = GroundedContext::select(
            ranked,
            self.config.context_chunks,
            self.config.max_context_chars,
        );
        info!(candidate_count, context_chunks = context.len(), reranked, "retrieval completed");

        let evidence =
            if context.is_empty() { Evidence::NotFound } else { Evidence::Found(context) };
        Ok(Retrieval { evidence, candidate_count, reranked, warnings })
    }

    /// Drop the index; later queries report [`RetrievalWarning::IndexUnavailable`].
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.build_lock.lock().await;
        self.index.clear().await
    }

    /// Statistics of the current index, or `None` before the first build.
    pub async fn stats(&self) -> Option<IndexStats> {
        self.index.stats().await
    }
}

fn check_input_limit(model: &dyn EmbeddingModel, chunk_size: usize) -> Result<()> {
    let Some(limit) = model.max_input_chars() else {
        return Ok(());
    };
    let longest = chunk_size + PASSAGE_PREFIX.chars().count();
    if longest > limit {
        return Err(RagError::Configuration(format!(
            "chunk_size ({chunk_size}) plus passage prefix exceeds the {limit}-character input \
             limit of embedding model '{}'",
            model.name()
        )));
    }
    Ok(())
}

/// Builder for constructing a [`RetrievalPipeline`].
///
/// `config` and `embedding_model` are required; the cross-encoder is
/// optional and the index defaults to an [`InMemoryVectorIndex`].
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<RagConfig>,
    embedding_model: Option<Arc<dyn EmbeddingModel>>,
    cross_encoder: Option<Arc<dyn CrossEncoder>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
}

impl RetrievalPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding model.
    pub fn embedding_model(mut self, model: Arc<dyn EmbeddingModel>) -> Self {
        self.embedding_model = Some(model);
        self
    }

    /// Set the cross-encoder used for reranking.
    pub fn cross_encoder(mut self, encoder: Arc<dyn CrossEncoder>) -> Self {
        self.cross_encoder = Some(encoder);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    /// Build the [`RetrievalPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if a required field is missing,
    /// the configuration is invalid, or configured chunks would exceed the
    /// embedding model's input limit.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Configuration("config is required".into()))?;
        config.validate()?;
        let model = self
            .embedding_model
            .ok_or_else(|| RagError::Configuration("embedding_model is required".into()))?;

        check_input_limit(model.as_ref(), config.chunk_size)?;
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)?;
        let embedder = Embedder::new(model, config.embedding_batch_size)?;

        Ok(RetrievalPipeline {
            config,
            chunker,
            embedder,
            reranker: self.cross_encoder.map(Reranker::new),
            index: self.vector_index.unwrap_or_else(|| Arc::new(InMemoryVectorIndex::new())),
            build_lock: Mutex::new(()),
        })
    }
}
