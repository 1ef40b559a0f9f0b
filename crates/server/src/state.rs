use assist_core::config::ServerSettings;
use assist_core::AppConfig;
use assist_knowledge::QueryPipeline;
use std::sync::Arc;
use std::time::Instant;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct ServerState {
    /// Query pipeline shared by every request
    pub pipeline: Arc<QueryPipeline>,

    /// Generation model reported by `/health`
    pub llm_model: String,

    /// Embedding model reported by `/health`
    pub embed_model: String,

    /// Bind address, CORS origins and request timeout
    pub settings: ServerSettings,

    pub started_at: Instant,
}

impl ServerState {
    pub fn new(pipeline: QueryPipeline, config: &AppConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            llm_model: config.llm.model.clone(),
            embed_model: config.embedding.model.clone(),
            settings: config.server.clone(),
            started_at: Instant::now(),
        }
    }
}
