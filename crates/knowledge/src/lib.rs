//! Knowledge base and query pipeline.
//!
//! Provides local-first RAG over ingested documents: SQLite vector storage,
//! pluggable embeddings, and an evidence-gated answering pipeline.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod memory_index;
pub mod parser;
pub mod rag;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use index::SqliteIndex;
pub use memory_index::MemoryIndex;
pub use rag::{AnswerResult, QueryPipeline, SourceRef};
pub use types::{DocumentChunk, IndexStats, IngestOptions, IngestStats};
pub use vector_index::VectorIndex;

use assist_core::{AppConfig, AppResult};
use embeddings::EmbeddingProvider;
use rag::{GenerationSettings, PipelinePorts, PromptSet};
use std::sync::Arc;

/// Create the configured embedding provider.
pub fn open_embedder(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    embeddings::create_provider(
        &config.embedding,
        config.embedding_endpoint(),
        config.timeouts.embedding(),
    )
}

/// Open the configured SQLite index, creating it if needed.
pub fn open_index(config: &AppConfig) -> AppResult<Arc<SqliteIndex>> {
    Ok(Arc::new(SqliteIndex::open(&config.index_path())?))
}

/// Wire a query pipeline from configuration.
pub fn build_pipeline(config: &AppConfig) -> AppResult<QueryPipeline> {
    config.validate()?;

    let ports = PipelinePorts {
        embedder: open_embedder(config)?,
        index: open_index(config)?,
        generator: assist_llm::create_client(&config.llm, config.timeouts.generation())?,
    };

    tracing::debug!(
        embedder = ports.embedder.provider_name(),
        generator = ports.generator.provider_name(),
        index = ?config.index_path(),
        "Building query pipeline"
    );

    QueryPipeline::new(
        config.rag.clone(),
        ports,
        PromptSet::load(&config.workspace)?,
        GenerationSettings::from_config(&config.llm, &config.timeouts),
        &config.timeouts,
    )
}

/// Ingest documents into the configured index.
pub async fn ingest(config: &AppConfig, options: &IngestOptions) -> AppResult<IngestStats> {
    config.validate()?;
    let embedder = open_embedder(config)?;
    let index = open_index(config)?;

    ingest::ingest(embedder.as_ref(), index.as_ref(), options).await
}

/// Report statistics for the configured index.
pub async fn stats(config: &AppConfig) -> AppResult<IndexStats> {
    let index = open_index(config)?;

    Ok(IndexStats {
        backend: index.backend_name().to_string(),
        path: index.path().map(|p| p.to_path_buf()),
        chunks_count: index.count().await?,
        db_size_bytes: index.size_bytes(),
    })
}
