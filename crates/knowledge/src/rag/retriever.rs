//! Candidate retrieval: embed the query, then ask the vector store.

use super::port::call_port;
use crate::embeddings::EmbeddingProvider;
use crate::types::DocumentChunk;
use crate::vector_index::VectorIndex;
use assist_core::{AppError, AppResult, Port};
use std::sync::Arc;
use std::time::Duration;

/// Output of a retrieval step.
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Embedding of the query as used for the store lookup
    pub query_embedding: Vec<f32>,

    /// Candidates in the store's order, at most `k`
    pub candidates: Vec<DocumentChunk>,
}

pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    embedding_timeout: Duration,
    store_timeout: Duration,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        embedding_timeout: Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            index,
            embedding_timeout,
            store_timeout,
        }
    }

    /// Fetch up to `k` candidate chunks for `query`.
    ///
    /// Exactly one embedding call and one store query are made. An empty
    /// store yields an empty candidate list.
    pub async fn retrieve(&self, query: &str, k: usize) -> AppResult<Retrieval> {
        if k == 0 {
            return Err(AppError::Config("retrieval k must be positive".to_string()));
        }

        let query_embedding = call_port(
            Port::Embedding,
            self.embedding_timeout,
            self.embedder.embed(query),
        )
        .await?;

        let mut candidates = call_port(
            Port::VectorStore,
            self.store_timeout,
            self.index.query(&query_embedding, k),
        )
        .await?;
        candidates.truncate(k);

        tracing::debug!(
            backend = self.index.backend_name(),
            "Retrieved {} candidates (k={})",
            candidates.len(),
            k
        );

        Ok(Retrieval {
            query_embedding,
            candidates,
        })
    }
}
