//! Ingest command handler.

use assist_core::{config::AppConfig, AppError};
use assist_knowledge::IngestOptions;
use clap::Args;
use std::path::PathBuf;

/// Ingest documents into the knowledge base
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest (.md, .txt, .html)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Clear the index before ingesting
    #[arg(long)]
    pub reset: bool,

    /// Chunk size in characters
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(long, default_value_t = 100)]
    pub chunk_overlap: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing ingest command for {} path(s)", self.paths.len());

        let options = IngestOptions {
            reset: self.reset,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            ..IngestOptions::new(self.paths.clone())
        };

        let stats = assist_knowledge::ingest(config, &options).await?;

        if self.json {
            let output = serde_json::json!({
                "filesCount": stats.files_count,
                "skippedCount": stats.skipped_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!(
                "Ingested {} files ({} chunks, {} bytes) in {:.2}s",
                stats.files_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            );
            if stats.skipped_count > 0 {
                println!("Skipped {} unsupported files", stats.skipped_count);
            }
        }

        Ok(())
    }
}
