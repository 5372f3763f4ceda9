//! Stub models shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use atlas_rag::{
    CrossEncoder, EmbeddingModel, PASSAGE_PREFIX, QUERY_PREFIX, RagError, Result,
};

pub const DIM: usize = 32;

/// Deterministic bag-of-words embedding that records every input it sees.
///
/// Prefixes are stripped before hashing so passages and queries that share
/// words land close together.
#[derive(Default)]
pub struct WordHashEmbedding {
    pub inputs: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub max_input_chars: Option<usize>,
}

impl WordHashEmbedding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_input_chars(limit: usize) -> Self {
        Self { max_input_chars: Some(limit), ..Self::default() }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn recorded(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

pub fn word_hash_vector(text: &str) -> Vec<f32> {
    let text = text
        .strip_prefix(PASSAGE_PREFIX)
        .or_else(|| text.strip_prefix(QUERY_PREFIX))
        .unwrap_or(text);
    let mut v = vec![0.0f32; DIM];
    for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let h = word
            .to_lowercase()
            .bytes()
            .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
        v[(h as usize) % DIM] += 1.0;
    }
    v
}

#[async_trait]
impl EmbeddingModel for WordHashEmbedding {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().extend(inputs.iter().cloned());
        if self.fail.load(Ordering::SeqCst) {
            return Err(RagError::Embedding {
                provider: "stub".into(),
                message: "model offline".into(),
            });
        }
        Ok(inputs.iter().map(|s| word_hash_vector(s)).collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn max_input_chars(&self) -> Option<usize> {
        self.max_input_chars
    }

    fn name(&self) -> &str {
        "word-hash"
    }
}

/// An embedding model that returns a fixed, possibly malformed, answer.
pub struct FixedEmbedding {
    pub vectors: Vec<Vec<f32>>,
    pub dimensions: usize,
}

#[async_trait]
impl EmbeddingModel for FixedEmbedding {
    async fn embed_batch(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.vectors.clone())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Cross-encoder that scores passages from a lookup table keyed by text.
#[derive(Default)]
pub struct TableCrossEncoder {
    pub scores: HashMap<String, f32>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl TableCrossEncoder {
    pub fn new(scores: &[(&str, f32)]) -> Self {
        Self {
            scores: scores.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }
}

#[async_trait]
impl CrossEncoder for TableCrossEncoder {
    async fn score(&self, _query: &str, passage: &str) -> Result<f32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::Reranker {
                reranker: "table".into(),
                message: "model failed to load".into(),
            });
        }
        Ok(self.scores.get(passage).copied().unwrap_or(0.0))
    }

    fn name(&self) -> &str {
        "table"
    }
}

/// Word-hash embedding that returns a NaN component for inputs containing `marker`.
pub struct PoisonedEmbedding {
    pub marker: &'static str,
}

#[async_trait]
impl EmbeddingModel for PoisonedEmbedding {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(inputs
            .iter()
            .map(|s| {
                let mut v = word_hash_vector(s);
                if s.contains(self.marker) {
                    v[0] = f32::NAN;
                }
                v
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "poisoned"
    }
}
