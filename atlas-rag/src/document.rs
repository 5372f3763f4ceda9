//! Data types for documents, chunks, and ranked results.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Extracted text of one uploaded file, or of one page of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Source identifier, usually the uploaded file name.
    pub id: String,
    /// The extracted text content.
    pub text: String,
    /// 1-based page number when the text came from a paginated source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Key-value metadata associated with the document.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document without page information.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), page: None, metadata: HashMap::new() }
    }

    /// Attach a 1-based page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A contiguous substring of a [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{source}#{page}_{ordinal}` or `{source}_{ordinal}`.
    pub id: String,
    /// Source identifier of the parent document.
    pub source: String,
    /// Position of this chunk within its document, starting at zero.
    pub ordinal: usize,
    /// Character (not byte) offsets of this chunk within the document text.
    pub span: Range<usize>,
    /// Page of the parent document, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// The chunk text.
    pub text: String,
}

impl Chunk {
    /// Length of the chunk in characters.
    pub fn char_len(&self) -> usize {
        self.span.end - self.span.start
    }
}

/// A chunk paired with its embedding, as stored in a vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The passage embedding of the chunk.
    pub embedding: Vec<f32>,
}

/// A first-stage hit: a [`Chunk`] and its vector similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// A second-stage hit.
///
/// `score` is the cross-encoder relevance when the candidate was reranked and
/// the vector similarity otherwise. `similarity` always holds the first-stage
/// score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Final ranking score.
    pub score: f32,
    /// Vector similarity from the first stage.
    pub similarity: f32,
}

impl From<SearchResult> for RankedResult {
    fn from(result: SearchResult) -> Self {
        Self { score: result.score, similarity: result.score, chunk: result.chunk }
    }
}

/// Ordered first-stage results of a single query.
pub type CandidateSet = Vec<SearchResult>;

/// Ordered second-stage results of a single query.
pub type RerankedSet = Vec<RankedResult>;
