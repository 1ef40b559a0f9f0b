//! Reranking: score candidates against the query and keep the best.

use super::port::call_port;
use super::scorer::cosine_similarity;
use super::types::ScoredCandidate;
use crate::embeddings::EmbeddingProvider;
use crate::types::DocumentChunk;
use assist_core::{AppResult, Port};
use std::sync::Arc;
use std::time::Duration;

pub struct Reranker {
    embedder: Arc<dyn EmbeddingProvider>,
    embedding_timeout: Duration,
}

impl Reranker {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, embedding_timeout: Duration) -> Self {
        Self {
            embedder,
            embedding_timeout,
        }
    }

    /// Re-embed the query and rank `candidates` by cosine similarity.
    ///
    /// No embedding call is made when there is nothing to rank.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<DocumentChunk>,
        top_n: usize,
    ) -> AppResult<Vec<ScoredCandidate>> {
        if candidates.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = call_port(
            Port::Embedding,
            self.embedding_timeout,
            self.embedder.embed(query),
        )
        .await?;

        Ok(rank(&query_embedding, candidates, top_n))
    }
}

/// Score candidates against a query embedding, best first, truncated to `top_n`.
///
/// Ties are broken by chunk id so the output does not depend on input order.
pub fn rank(
    query_embedding: &[f32],
    candidates: Vec<DocumentChunk>,
    top_n: usize,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|chunk| {
            let score = cosine_similarity(query_embedding, &chunk.embedding);
            ScoredCandidate::new(chunk, score)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.chunk.id.cmp(&b.chunk.id))
    });
    scored.truncate(top_n);
    scored
}
