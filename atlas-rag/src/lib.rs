//! # atlas-rag
//!
//! Grounded question answering over uploaded Turkish enterprise documents
//! (ERP manuals, financial reports, tax legislation).
//!
//! ## Overview
//!
//! Retrieval runs in two stages:
//!
//! 1. **Vector search**: chunks are embedded with the `passage: ` prefix, the
//!    query with `query: `, and the nearest `top_k` chunks by cosine
//!    similarity become the candidate set.
//! 2. **Cross-encoder rerank**: each (query, candidate) pair is scored
//!    jointly and the candidates are reordered. This stage is optional per
//!    query and falls back to vector order if the model fails.
//!
//! The top passages that fit the context budget form a [`GroundedContext`],
//! which [`AnswerGuard`] packages with a strict "answer only from context,
//! copy numbers verbatim" instruction for any [`Completer`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use atlas_rag::{AnswerGuard, Document, RagConfig, RetrievalPipeline};
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_model(Arc::new(embedding_model))
//!     .cross_encoder(Arc::new(cross_encoder))
//!     .build()?;
//!
//! pipeline.process(&[Document::new("vergi.pdf", text).with_page(1)]).await?;
//!
//! let retrieval = pipeline.retrieve("KDV oranı nedir?", 25, true).await?;
//! let answer = AnswerGuard::new().answer(&completer, "KDV oranı nedir?", &retrieval).await?;
//! ```
//!
//! ## Features
//!
//! - `openai` – [`openai::OpenAIEmbeddingModel`] for OpenAI-compatible embedding APIs
//! - `tei` – [`tei::TeiCrossEncoder`] for text-embeddings-inference rerank servers
//! - `groq` – [`groq::OpenAICompatibleCompleter`] with Groq model presets

pub mod chunking;
pub mod completion;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod guard;
pub mod index;
pub mod inmemory;
pub mod mock;
pub mod pipeline;
pub mod reranker;

#[cfg(feature = "groq")]
pub mod groq;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "tei")]
pub mod tei;

pub use chunking::{Chunker, Chunks};
pub use completion::{Completer, PromptPayload};
pub use config::{RagConfig, RagConfigBuilder};
pub use context::{GroundedContext, PASSAGE_SEPARATOR, Source};
pub use document::{
    CandidateSet, Chunk, Document, IndexEntry, RankedResult, RerankedSet, SearchResult,
};
pub use embedding::{Embedder, EmbeddingModel, PASSAGE_PREFIX, QUERY_PREFIX};
pub use error::{RagError, Result};
pub use guard::{Answer, AnswerGuard, NO_EVIDENCE_ANSWER, SYSTEM_INSTRUCTION};
pub use index::{IndexStats, VectorIndex};
pub use inmemory::InMemoryVectorIndex;
pub use mock::MockCompleter;
pub use pipeline::{
    BuildReport, Evidence, Retrieval, RetrievalPipeline, RetrievalPipelineBuilder,
    RetrievalWarning,
};
pub use reranker::{CrossEncoder, Reranker, pass_through};
