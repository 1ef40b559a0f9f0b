//! Document ingestion: parse, chunk, embed and upsert.

use crate::chunker::chunk_text;
use crate::embeddings::EmbeddingProvider;
use crate::parser::{self, ContentType};
use crate::types::{DocumentChunk, IngestOptions, IngestStats};
use crate::vector_index::VectorIndex;
use assist_core::{AppError, AppResult};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Number of chunk texts sent to the embedder per request.
const EMBED_BATCH_SIZE: usize = 32;

/// Ingest every supported file under `options.paths`.
///
/// Unsupported or unreadable files are skipped and counted. Embedding and
/// store failures abort the run.
pub async fn ingest(
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    options: &IngestOptions,
) -> AppResult<IngestStats> {
    if options.chunk_size == 0 {
        return Err(AppError::Config("chunk size must be positive".to_string()));
    }

    let start = Instant::now();
    tracing::info!("Starting ingestion of {} path(s)", options.paths.len());

    let files = collect_files(&options.paths)?;
    if files.is_empty() {
        return Err(AppError::Knowledge(format!(
            "No supported documents found in {:?}",
            options.paths
        )));
    }

    if options.reset {
        index.reset().await?;
    }

    let mut stats = IngestStats::default();

    for file in files {
        let text = match parser::parse_file(&file) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", file, e);
                stats.skipped_count += 1;
                continue;
            }
        };

        let chunks = ingest_text(embedder, &file, &text, options).await?;

        // Drop chunks from an earlier, possibly longer, version of the file
        let stale = index.remove_path(&file.to_string_lossy()).await?;
        if stale > 0 {
            tracing::debug!("Replaced {} existing chunks of {:?}", stale, file);
        }
        index.upsert(&chunks).await?;

        stats.files_count += 1;
        stats.chunks_count += chunks.len() as u32;
        stats.bytes_processed += text.len() as u64;

        tracing::debug!("Ingested {:?}: {} chunks", file, chunks.len());
    }

    stats.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        "Ingestion completed: {} files, {} chunks, {} skipped in {:.2}s",
        stats.files_count,
        stats.chunks_count,
        stats.skipped_count,
        stats.duration_secs
    );

    Ok(stats)
}

/// Chunk and embed one document's text.
async fn ingest_text(
    embedder: &dyn EmbeddingProvider,
    path: &Path,
    text: &str,
    options: &IngestOptions,
) -> AppResult<Vec<DocumentChunk>> {
    let spans = chunk_text(text, options.chunk_size, options.chunk_overlap);
    let path_str = path.to_string_lossy().to_string();
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.clone());
    let ingested_at = Utc::now().to_rfc3339();

    let mut chunks = Vec::with_capacity(spans.len());
    for batch in spans.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != batch.len() {
            return Err(AppError::Knowledge(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                batch.len()
            )));
        }

        for (span, embedding) in batch.iter().zip(embeddings) {
            chunks.push(
                DocumentChunk::new(chunk_id(&path_str, span.position), span.text.clone(), embedding)
                    .with_metadata(serde_json::json!({
                        "source": source,
                        "path": path_str,
                        "position": span.position,
                        "start": span.start,
                        "end": span.end,
                        "ingested_at": ingested_at,
                    })),
            );
        }
    }

    Ok(chunks)
}

/// Stable chunk id: SHA-256 of the document path and chunk position.
pub fn chunk_id(path: &str, position: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hasher.update(b":");
    hasher.update(position.to_le_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Expand paths into a sorted list of supported files.
fn collect_files(paths: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .follow_links(false)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path())
                    .filter(|p| ContentType::from_path(p).is_supported()),
            );
        } else {
            return Err(AppError::Knowledge(format!("Path not found: {:?}", path)));
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
