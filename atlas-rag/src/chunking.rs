//! Fixed-size, overlapping document chunking.
//!
//! Lengths are measured in characters (Unicode scalar values), the same unit
//! the embedding model's input limit is expressed in by
//! [`EmbeddingModel::max_input_chars`](crate::EmbeddingModel::max_input_chars).
//! Turkish text is never cut inside a multi-byte character.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// Splits documents into fixed-size chunks with a configured overlap.
///
/// Window `i` covers characters `[i * step, i * step + chunk_size)` where
/// `step = chunk_size - overlap`. The last window ends exactly at the end of
/// the text, so consecutive chunks always overlap by exactly `overlap`
/// characters and together cover the whole document.
///
/// # Example
///
/// ```rust
/// use atlas_rag::{Chunker, Document};
///
/// let chunker = Chunker::new(10, 3).unwrap();
/// let doc = Document::new("kdv.txt", "KDV oranı yüzde 20 olarak uygulanır.");
/// let chunks: Vec<_> = chunker.chunk(&doc).collect();
/// assert!(chunks.iter().all(|c| c.text.chars().count() <= 10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a new `Chunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if `chunk_size` is zero or
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Configuration("chunk_size must be greater than zero".into()));
        }
        if overlap >= chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Maximum number of characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of characters shared by consecutive chunks.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily split a document into chunks, in document order.
    ///
    /// The returned iterator is cheap to clone; a clone restarts from the
    /// position it was cloned at.
    pub fn chunk<'a>(&self, document: &'a Document) -> Chunks<'a> {
        Chunks {
            document,
            chunk_size: self.chunk_size,
            step: self.chunk_size - self.overlap,
            byte_pos: 0,
            char_pos: 0,
            ordinal: 0,
            finished: document.text.is_empty(),
        }
    }
}

/// Iterator over the chunks of one document. Created by [`Chunker::chunk`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    document: &'a Document,
    chunk_size: usize,
    step: usize,
    byte_pos: usize,
    char_pos: usize,
    ordinal: usize,
    finished: bool,
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.finished {
            return None;
        }

        let rest = &self.document.text[self.byte_pos..];
        let (window_bytes, window_chars) = match rest.char_indices().nth(self.chunk_size) {
            Some((end, _)) => (end, self.chunk_size),
            None => {
                // Remaining text fits in one window: this is the last chunk.
                self.finished = true;
                (rest.len(), rest.chars().count())
            }
        };

        let chunk = Chunk {
            id: chunk_id(self.document, self.ordinal),
            source: self.document.id.clone(),
            ordinal: self.ordinal,
            span: self.char_pos..self.char_pos + window_chars,
            page: self.document.page,
            text: rest[..window_bytes].to_string(),
        };

        if !self.finished {
            // More than `chunk_size` characters remain, so `step` is in bounds.
            let step_bytes =
                rest.char_indices().nth(self.step).map(|(i, _)| i).unwrap_or(rest.len());
            self.byte_pos += step_bytes;
            self.char_pos += self.step;
        }
        self.ordinal += 1;

        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}

fn chunk_id(document: &Document, ordinal: usize) -> String {
    match document.page {
        Some(page) => format!("{}#{page}_{ordinal}", document.id),
        None => format!("{}_{ordinal}", document.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(matches!(Chunker::new(100, 100), Err(RagError::Configuration(_))));
        assert!(matches!(Chunker::new(100, 150), Err(RagError::Configuration(_))));
        assert!(matches!(Chunker::new(0, 0), Err(RagError::Configuration(_))));
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn empty_document_has_no_chunks() {
        let chunker = Chunker::new(10, 2).unwrap();
        assert_eq!(chunker.chunk(&Document::new("d", "")).count(), 0);
    }

    #[test]
    fn short_document_is_one_chunk() {
        let chunker = Chunker::new(50, 10).unwrap();
        let doc = Document::new("d", "Amortisman süresi 5 yıldır.");
        let chunks: Vec<_> = chunker.chunk(&doc).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, doc.text);
        assert_eq!(chunks[0].span, 0..doc.text.chars().count());
    }

    #[test]
    fn windows_slide_by_step() {
        let chunker = Chunker::new(4, 1).unwrap();
        let doc = Document::new("d", "abcdefghij");
        let texts: Vec<_> = chunker.chunk(&doc).map(|c| c.text).collect();
        assert_eq!(texts, ["abcd", "defg", "ghij"]);
    }

    #[test]
    fn exact_fit_emits_no_contained_tail() {
        let chunker = Chunker::new(4, 2).unwrap();
        let doc = Document::new("d", "abcdef");
        let spans: Vec<_> = chunker.chunk(&doc).map(|c| c.span).collect();
        assert_eq!(spans, [0..4, 2..6]);
    }

    #[test]
    fn splits_on_character_boundaries() {
        let chunker = Chunker::new(3, 1).unwrap();
        let doc = Document::new("d", "çğıöşü");
        let texts: Vec<_> = chunker.chunk(&doc).map(|c| c.text).collect();
        assert_eq!(texts, ["çğı", "ıöş", "şü"]);
    }

    #[test]
    fn ids_include_page_when_known() {
        let chunker = Chunker::new(3, 0).unwrap();
        let doc = Document::new("rapor.pdf", "abcdef").with_page(7);
        let ids: Vec<_> = chunker.chunk(&doc).map(|c| c.id).collect();
        assert_eq!(ids, ["rapor.pdf#7_0", "rapor.pdf#7_1"]);
    }

    #[test]
    fn iterator_is_restartable() {
        let chunker = Chunker::new(5, 2).unwrap();
        let doc = Document::new("d", "0123456789abcdef");
        let chunks = chunker.chunk(&doc);
        let first: Vec<_> = chunks.clone().collect();
        let second: Vec<_> = chunks.collect();
        assert_eq!(first, second);
    }
}
