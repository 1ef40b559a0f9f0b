//! Vector store port.
//!
//! Defines a trait for backend-agnostic chunk storage and similarity search.

use crate::types::DocumentChunk;
use assist_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Similarity search returning the top-k chunks, best first
/// - Upserting chunks keyed by id
/// - Dropping every chunk of one source document
/// - Counting and clearing stored chunks
///
/// Backends use interior mutability so one instance can be shared behind an
/// `Arc` by concurrent queries and ingestion.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name for logs and stats (e.g., "sqlite", "memory").
    fn backend_name(&self) -> &str;

    /// Return at most `top_k` chunks ranked by the backend's own similarity.
    ///
    /// The ranking is only a candidate order; callers re-score.
    async fn query(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<DocumentChunk>>;

    /// Insert or replace chunks by id.
    async fn upsert(&self, chunks: &[DocumentChunk]) -> AppResult<()>;

    /// Remove every chunk whose `metadata.path` equals `path`; returns how many.
    async fn remove_path(&self, path: &str) -> AppResult<usize>;

    /// Number of stored chunks.
    async fn count(&self) -> AppResult<usize>;

    /// Remove every stored chunk.
    async fn reset(&self) -> AppResult<()>;
}
