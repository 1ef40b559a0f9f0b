//! Ranking correctness across the store, retriever and reranker.

use crate::embeddings::providers::MockProvider;
use crate::embeddings::EmbeddingProvider;
use crate::index::SqliteIndex;
use crate::rag::rerank::rank;
use crate::rag::{Reranker, Retriever};
use crate::types::DocumentChunk;
use crate::vector_index::VectorIndex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

fn chunk(id: &str, source: &str, text: &str, embedding: Vec<f32>) -> DocumentChunk {
    DocumentChunk::new(id, text, embedding).with_metadata(json!({ "source": source }))
}

#[tokio::test]
async fn test_relevant_chunk_ranks_first() {
    let temp = TempDir::new().unwrap();
    let index = SqliteIndex::open(&temp.path().join("index.db")).unwrap();

    index
        .upsert(&[
            chunk("kyc", "kyc.md", "KYC requires ID", normalize(&[0.9, 0.1, 0.0])),
            chunk("fees", "fees.md", "Card fees", normalize(&[0.1, 0.9, 0.0])),
            chunk("misc", "misc.md", "Office hours", normalize(&[0.0, 0.1, 0.9])),
        ])
        .await
        .unwrap();

    let query = normalize(&[1.0, 0.0, 0.0]);
    let candidates = index.query(&query, 3).await.unwrap();
    assert_eq!(candidates[0].id, "kyc");

    let ranked = rank(&query, candidates, 2);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].chunk.source(), "kyc.md");
    assert!(ranked[0].score > 0.9);
    assert!(ranked[1].score < 0.2);
}

#[tokio::test]
async fn test_mock_embeddings_end_to_end() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(256));
    let index = Arc::new(SqliteIndex::open_in_memory().unwrap());

    let texts = [
        ("faq.md", "To reset your password open the login page and choose forgot password."),
        ("kyc.md", "Customers must upload a government issued identity document for KYC."),
        ("fees.md", "International card transactions carry a currency conversion fee."),
    ];
    let mut chunks = Vec::new();
    for (i, (source, text)) in texts.iter().enumerate() {
        let embedding = embedder.embed(text).await.unwrap();
        chunks.push(chunk(&format!("c{}", i), source, text, embedding));
    }
    index.upsert(&chunks).await.unwrap();

    let retriever = Retriever::new(
        Arc::clone(&embedder),
        index.clone(),
        Duration::from_secs(5),
        Duration::from_secs(5),
    );
    let reranker = Reranker::new(embedder, Duration::from_secs(5));

    let retrieval = retriever.retrieve("forgot password", 3).await.unwrap();
    assert_eq!(retrieval.candidates.len(), 3);

    let ranked = reranker
        .rerank("forgot password", retrieval.candidates, 1)
        .await
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].chunk.source(), "faq.md");
}

#[tokio::test]
async fn test_retrieve_respects_k() {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(16));
    let index = Arc::new(SqliteIndex::open_in_memory().unwrap());
    let chunks: Vec<DocumentChunk> = (0..5)
        .map(|i| chunk(&format!("c{}", i), "doc.md", "text", vec![1.0; 16]))
        .collect();
    index.upsert(&chunks).await.unwrap();

    let retriever = Retriever::new(embedder, index, Duration::from_secs(5), Duration::from_secs(5));

    let retrieval = retriever.retrieve("policy text", 2).await.unwrap();
    assert_eq!(retrieval.candidates.len(), 2);
    assert_eq!(retrieval.query_embedding.len(), 16);

    assert!(retriever.retrieve("policy text", 0).await.is_err());
}
