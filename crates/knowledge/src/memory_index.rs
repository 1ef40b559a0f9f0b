//! In-memory vector index.

use crate::rag::scorer::cosine_similarity;
use crate::types::DocumentChunk;
use crate::vector_index::VectorIndex;
use assist_core::{AppError, AppResult, Port};
use std::sync::RwLock;

/// Vector index held entirely in memory. Used by tests and one-shot demos.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    chunks: RwLock<Vec<DocumentChunk>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index pre-populated with chunks.
    pub fn with_chunks(chunks: Vec<DocumentChunk>) -> Self {
        Self {
            chunks: RwLock::new(chunks),
        }
    }
}

fn poisoned() -> AppError {
    AppError::port(Port::VectorStore, "memory index lock poisoned")
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn query(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<DocumentChunk>> {
        let chunks = self.chunks.read().map_err(|_| poisoned())?;

        let mut scored: Vec<(f32, &DocumentChunk)> = chunks
            .iter()
            .map(|chunk| (cosine_similarity(query_embedding, &chunk.embedding), chunk))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, chunk)| chunk.clone())
            .collect())
    }

    async fn upsert(&self, new_chunks: &[DocumentChunk]) -> AppResult<()> {
        let mut chunks = self.chunks.write().map_err(|_| poisoned())?;

        for chunk in new_chunks {
            match chunks.iter_mut().find(|c| c.id == chunk.id) {
                Some(existing) => *existing = chunk.clone(),
                None => chunks.push(chunk.clone()),
            }
        }
        Ok(())
    }

    async fn remove_path(&self, path: &str) -> AppResult<usize> {
        let mut chunks = self.chunks.write().map_err(|_| poisoned())?;
        let before = chunks.len();
        chunks.retain(|c| c.metadata.get("path").and_then(|v| v.as_str()) != Some(path));
        Ok(before - chunks.len())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.chunks.read().map_err(|_| poisoned())?.len())
    }

    async fn reset(&self) -> AppResult<()> {
        self.chunks.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }
}
