//! Stats command handler.
//!
//! Shows what the vector index currently holds.

use assist_core::{config::AppConfig, AppError};
use clap::Args;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing stats command");

        let stats = assist_knowledge::stats(config).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Backend: {}", stats.backend);
            if let Some(path) = &stats.path {
                println!("Path: {}", path.display());
            }
            println!("Chunks: {}", stats.chunks_count);
            println!("Size: {} bytes", stats.db_size_bytes);
            println!("Embedding model: {}", config.embedding.model);
        }

        Ok(())
    }
}
