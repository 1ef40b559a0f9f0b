//! Ask command handler.
//!
//! Runs one question through the query pipeline and prints the answer.

use assist_core::{config::AppConfig, AppError, AppResult};
use assist_knowledge::AnswerResult;
use clap::Args;
use std::path::PathBuf;

/// Ask a question against the knowledge base
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let query = self.get_query()?;
        let pipeline = assist_knowledge::build_pipeline(config)?;
        let result = pipeline.run(&query).await?;

        tracing::debug!(
            "Answer route: {:?}, top_score: {:?}, sources: {}",
            result.route,
            result.top_score,
            result.sources.len()
        );

        if self.json {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            print!("{}", render(&result));
        }

        Ok(())
    }

    fn get_query(&self) -> AppResult<String> {
        match (&self.query, &self.file) {
            (Some(query), _) => Ok(query.clone()),
            (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
            (None, None) => Err(AppError::Config("No question provided".to_string())),
        }
    }
}

/// Human-readable answer with a numbered source list.
fn render(result: &AnswerResult) -> String {
    let mut out = format!("{}\n", result.answer);

    if !result.sources.is_empty() {
        out.push_str("\nSources:\n");
        for (i, source) in result.sources.iter().enumerate() {
            out.push_str(&format!("  {}. {} (score {:.2})\n", i + 1, source.source, source.score));
        }
    }

    out
}
