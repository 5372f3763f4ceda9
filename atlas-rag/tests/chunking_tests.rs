//! Property tests for fixed-size overlapping chunking.

use atlas_rag::{Chunker, Document};
use proptest::prelude::*;

fn arb_size_and_overlap() -> impl Strategy<Value = (usize, usize)> {
    (1usize..60).prop_flat_map(|size| (Just(size), 0..size))
}

fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}

/// *For any* valid chunk size and overlap, every chunk is at most `chunk_size`
/// characters, spans cover the whole document, and consecutive spans overlap
/// by exactly `overlap` characters.
mod prop_chunk_coverage_and_overlap {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn spans_cover_document_with_exact_overlap(
            (size, overlap) in arb_size_and_overlap(),
            text in "[a-zçğıöşüÇĞİÖŞÜ0-9 .,%\n]{0,400}",
        ) {
            let chunker = Chunker::new(size, overlap).unwrap();
            let doc = Document::new("belge.pdf", text.clone());
            let chunks: Vec<_> = chunker.chunk(&doc).collect();
            let total = text.chars().count();

            if total == 0 {
                prop_assert!(chunks.is_empty());
                return Ok(());
            }

            prop_assert_eq!(chunks[0].span.start, 0);
            prop_assert_eq!(chunks.last().unwrap().span.end, total);

            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.ordinal, i);
                prop_assert!(chunk.char_len() <= size);
                prop_assert_eq!(chunk.text.chars().count(), chunk.char_len());
                prop_assert_eq!(&chunk.text, &char_slice(&text, chunk.span.start, chunk.span.end));
                prop_assert_eq!(&chunk.source, "belge.pdf");
            }

            for pair in chunks.windows(2) {
                prop_assert_eq!(pair[1].span.start, pair[0].span.start + (size - overlap));
                prop_assert_eq!(pair[0].span.end - pair[1].span.start, overlap);
            }
        }
    }
}

#[test]
fn chunks_follow_document_order_for_tables_spanning_chunks() {
    let text = "Tablo 1: 2023 ciro 1.250.000 TL | 2024 ciro 1.487.500 TL | artış %19";
    let chunker = Chunker::new(30, 10).unwrap();
    let chunks: Vec<_> = chunker.chunk(&Document::new("rapor.pdf", text)).collect();

    let starts: Vec<_> = chunks.iter().map(|c| c.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);

    // Every number appears intact in at least one chunk.
    for number in ["1.250.000", "1.487.500", "%19"] {
        assert!(chunks.iter().any(|c| c.text.contains(number)), "{number} was split");
    }
}

#[test]
fn page_is_carried_to_every_chunk() {
    let chunker = Chunker::new(8, 2).unwrap();
    let doc = Document::new("kilavuz.pdf", "Stok kartı açılışı ve birim tanımları").with_page(12);
    assert!(chunker.chunk(&doc).all(|c| c.page == Some(12)));
}
