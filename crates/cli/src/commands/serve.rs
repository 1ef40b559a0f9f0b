//! Serve command handler.

use anyhow::Context;
use assist_core::config::AppConfig;
use assist_server::{start_server, ServerState};
use clap::Args;

/// Serve the HTTP query API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, mut config: AppConfig) -> anyhow::Result<()> {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }

        tracing::info!("Executing serve command on {}", config.server.bind);

        let pipeline = assist_knowledge::build_pipeline(&config)?;
        let state = ServerState::new(pipeline, &config);

        start_server(state)
            .await
            .with_context(|| format!("Server on {} stopped with an error", config.server.bind))
    }
}
