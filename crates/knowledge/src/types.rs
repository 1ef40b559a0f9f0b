//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source label used when a chunk carries no `source` metadata.
pub const DEFAULT_SOURCE: &str = "document";

/// A unit of indexed text with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Stable chunk identifier
    pub id: String,

    /// Chunk text
    pub text: String,

    /// Free-form metadata (`source`, `path`, `position`, `ingested_at`)
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// Embedding vector
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl DocumentChunk {
    /// Create a chunk without metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: serde_json::Value::Null,
            embedding,
        }
    }

    /// Attach metadata to the chunk.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Source label, falling back to [`DEFAULT_SOURCE`].
    pub fn source(&self) -> &str {
        self.metadata
            .get("source")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOURCE)
    }
}

/// Options for an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Files or directories to ingest
    pub paths: Vec<PathBuf>,

    /// Clear the index before ingesting
    pub reset: bool,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl IngestOptions {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            reset: false,
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    100
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of files ingested
    pub files_count: u32,

    /// Number of files skipped (unsupported or unreadable)
    pub skipped_count: u32,

    /// Number of chunks written
    pub chunks_count: u32,

    /// Total bytes of extracted text
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Index statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Index backend name
    pub backend: String,

    /// Index location
    pub path: Option<PathBuf>,

    /// Number of chunks stored
    pub chunks_count: usize,

    /// Database size on disk in bytes
    pub db_size_bytes: u64,
}
