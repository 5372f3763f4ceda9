//! Tests for the asymmetric prefix contract and output validation of [`Embedder`].

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use atlas_rag::{Chunker, Document, Embedder, RagError};
use common::{DIM, FixedEmbedding, WordHashEmbedding};
use proptest::prelude::*;

fn chunks_of(text: &str) -> Vec<atlas_rag::Chunk> {
    Chunker::new(1000, 0).unwrap().chunk(&Document::new("d", text)).collect()
}

/// *For any* chunk text C, `embed_documents([C])` sends `"passage: " + C`;
/// *for any* query Q, `embed_query(Q)` sends `"query: " + Q`.
mod prop_prefixes_never_swapped_or_omitted {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn documents_and_queries_get_their_own_prefix(
            passage in "[a-zA-Zçğıöşü0-9 %.,]{1,200}",
            query in "[a-zA-Zçğıöşü0-9 ?]{0,80}",
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let model = Arc::new(WordHashEmbedding::new());
            let embedder = Embedder::new(model.clone(), 8).unwrap();

            rt.block_on(async {
                embedder.embed_documents(&chunks_of(&passage)).await.unwrap();
                embedder.embed_query(&query).await.unwrap();
            });

            let inputs = model.recorded();
            prop_assert_eq!(inputs.len(), 2);
            prop_assert_eq!(&inputs[0], &format!("passage: {passage}"));
            prop_assert_eq!(&inputs[1], &format!("query: {query}"));
        }
    }
}

#[tokio::test]
async fn documents_are_sent_in_configured_batches() {
    let model = Arc::new(WordHashEmbedding::new());
    let embedder = Embedder::new(model.clone(), 2).unwrap();
    let chunks: Vec<_> = Chunker::new(4, 0)
        .unwrap()
        .chunk(&Document::new("d", "aaaabbbbccccddddeeee"))
        .collect();
    assert_eq!(chunks.len(), 5);

    let vectors = embedder.embed_documents(&chunks).await.unwrap();

    assert_eq!(vectors.len(), 5);
    assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        model.recorded(),
        ["passage: aaaa", "passage: bbbb", "passage: cccc", "passage: dddd", "passage: eeee"]
    );
}

#[tokio::test]
async fn zero_batch_size_is_a_configuration_error() {
    let result = Embedder::new(Arc::new(WordHashEmbedding::new()), 0);
    assert!(matches!(result, Err(RagError::Configuration(_))));
}

#[tokio::test]
async fn wrong_dimensionality_is_an_embedding_error() {
    let model = FixedEmbedding { vectors: vec![vec![0.5; DIM - 1]], dimensions: DIM };
    let embedder = Embedder::new(Arc::new(model), 4).unwrap();

    let err = embedder.embed_query("KDV oranı nedir?").await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }), "got {err:?}");
}

#[tokio::test]
async fn non_finite_values_are_an_embedding_error() {
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let model = FixedEmbedding { vectors: vec![vec![bad, 0.0]], dimensions: 2 };
        let embedder = Embedder::new(Arc::new(model), 4).unwrap();

        let err = embedder.embed_documents(&chunks_of("bozuk parça")).await.unwrap_err();
        assert!(matches!(err, RagError::Embedding { .. }), "got {err:?}");
        assert!(err.to_string().contains("non-finite"));

        assert!(embedder.embed_query("KDV").await.is_err());
    }
}

#[tokio::test]
async fn wrong_vector_count_is_an_embedding_error() {
    let model = FixedEmbedding { vectors: vec![vec![1.0; 4]], dimensions: 4 };
    let embedder = Embedder::new(Arc::new(model), 4).unwrap();
    let chunks = Chunker::new(3, 0).unwrap().chunk(&Document::new("d", "abcdef")).collect::<Vec<_>>();

    let err = embedder.embed_documents(&chunks).await.unwrap_err();
    assert!(err.to_string().contains("expected 2 vectors"), "got {err}");
}

#[tokio::test]
async fn model_failure_is_an_embedding_error() {
    let model = Arc::new(WordHashEmbedding::new());
    model.set_failing(true);
    let embedder = Embedder::new(model, 4).unwrap();

    let err = embedder.embed_query("Fatura kesim tarihi?").await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
}

#[tokio::test]
async fn oversized_input_is_rejected_not_truncated() {
    let model = Arc::new(WordHashEmbedding::with_max_input_chars(20));
    let embedder = Embedder::new(model.clone(), 4).unwrap();

    let err = embedder.embed_query("Amortisman süresi kaç yıl olarak hesaplanır?").await.unwrap_err();

    assert!(matches!(err, RagError::Configuration(_)), "got {err:?}");
    assert!(model.recorded().is_empty(), "model must not be called");
}
