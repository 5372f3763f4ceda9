//! The grounded context handed to the completion model, and its citations.

use serde::{Deserialize, Serialize};

use crate::document::{RankedResult, RerankedSet};

/// Separator placed between rendered passages.
pub const PASSAGE_SEPARATOR: &str = "\n\n---\n\n";

/// The final, ordered set of chunks shown to the completion model for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundedContext {
    passages: Vec<RankedResult>,
}

/// A citation record for one passage of a [`GroundedContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// 1-based position in the context, matching `[Kaynak n: ...]`.
    pub index: usize,
    /// Source document identifier.
    pub source: String,
    /// Page number, if known.
    pub page: Option<u32>,
    /// Full passage text.
    pub text: String,
    /// Final ranking score.
    pub score: f32,
    /// First-stage vector similarity.
    pub similarity: f32,
}

impl GroundedContext {
    /// Select the context window from ranked results.
    ///
    /// Takes results in ranked order, at most `max_chunks` of them, and stops
    /// at the first one whose text would push the combined length past
    /// `max_chars` characters. Passages are never split.
    pub fn select(ranked: RerankedSet, max_chunks: usize, max_chars: usize) -> Self {
        let mut used = 0usize;
        let mut passages = Vec::new();
        for result in ranked.into_iter().take(max_chunks) {
            let len = result.chunk.text.chars().count();
            if used + len > max_chars {
                break;
            }
            used += len;
            passages.push(result);
        }
        Self { passages }
    }

    /// The selected passages in ranked order.
    pub fn passages(&self) -> &[RankedResult] {
        &self.passages
    }

    /// Number of passages.
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Returns `true` if no passage was selected.
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Combined passage length in characters, excluding citation tags.
    pub fn char_len(&self) -> usize {
        self.passages.iter().map(|p| p.chunk.text.chars().count()).sum()
    }

    /// Render the passages as cited context text.
    ///
    /// Each passage is tagged `[Kaynak n: source, Sayfa p]` (the page part is
    /// omitted when unknown), and passages are separated by [`PASSAGE_SEPARATOR`].
    pub fn render(&self) -> String {
        self.passages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let n = i + 1;
                match p.chunk.page {
                    Some(page) => {
                        format!("[Kaynak {n}: {}, Sayfa {page}]\n{}", p.chunk.source, p.chunk.text)
                    }
                    None => format!("[Kaynak {n}: {}]\n{}", p.chunk.source, p.chunk.text),
                }
            })
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR)
    }

    /// Citation records for every passage.
    pub fn sources(&self) -> Vec<Source> {
        self.passages
            .iter()
            .enumerate()
            .map(|(i, p)| Source {
                index: i + 1,
                source: p.chunk.source.clone(),
                page: p.chunk.page,
                text: p.chunk.text.clone(),
                score: p.score,
                similarity: p.similarity,
            })
            .collect()
    }
}
