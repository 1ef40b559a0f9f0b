//! Configuration management for Assist.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config file (.assist/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The resulting `AppConfig` is built once at startup and passed by value or
//! reference into every component; nothing reads configuration lazily.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Known generation providers.
const KNOWN_LLM_PROVIDERS: [&str; 1] = ["ollama"];

/// Known embedding providers.
const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .assist/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Generation port settings
    pub llm: LlmSettings,

    /// Embedding port settings
    pub embedding: EmbeddingSettings,

    /// Query pipeline tuning
    pub rag: RagConfig,

    /// Per-port call deadlines
    pub timeouts: PortTimeouts,

    /// Vector index location
    pub index: IndexSettings,

    /// HTTP transport settings
    pub server: ServerSettings,
}

/// Generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmSettings {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Cap on generated tokens; the model default applies when unset
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// "ollama" or "mock"
    pub provider: String,

    /// Endpoint; falls back to the LLM endpoint when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    pub model: String,

    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: None,
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
        }
    }
}

/// Query pipeline settings.
///
/// Read-only for the lifetime of a pipeline; safe to share across
/// concurrent invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RagConfig {
    /// Retrieval breadth
    pub top_k: usize,

    /// Candidates kept after reranking (<= top_k)
    pub rerank_top_k: usize,

    /// Character budget for the evidence window
    pub max_context_chars: usize,

    /// Minimum top similarity to accept evidence, in [0, 1]
    pub rag_score_threshold: f32,

    /// Require an interrogative word before routing long queries to retrieval
    pub strict_classifier: bool,

    /// Rerank with the retrieval embedding instead of embedding the query again
    pub reuse_query_embedding: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            rerank_top_k: 5,
            max_context_chars: 2400,
            rag_score_threshold: 0.5,
            strict_classifier: true,
            reuse_query_embedding: false,
        }
    }
}

impl RagConfig {
    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> AppResult<()> {
        if self.top_k == 0 {
            return Err(AppError::Config("topK must be greater than 0".to_string()));
        }

        if self.rerank_top_k == 0 || self.rerank_top_k > self.top_k {
            return Err(AppError::Config(format!(
                "rerankTopK must be in 1..={} (got {})",
                self.top_k, self.rerank_top_k
            )));
        }

        if self.max_context_chars == 0 {
            return Err(AppError::Config(
                "maxContextChars must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.rag_score_threshold) {
            return Err(AppError::Config(format!(
                "ragScoreThreshold must be within [0, 1] (got {})",
                self.rag_score_threshold
            )));
        }

        Ok(())
    }
}

/// Deadlines applied to each port call, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortTimeouts {
    pub embedding_secs: u64,
    pub vector_store_secs: u64,
    pub generation_secs: u64,
}

impl Default for PortTimeouts {
    fn default() -> Self {
        Self {
            embedding_secs: 30,
            vector_store_secs: 10,
            generation_secs: 120,
        }
    }
}

impl PortTimeouts {
    pub fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding_secs)
    }

    pub fn vector_store(&self) -> Duration {
        Duration::from_secs(self.vector_store_secs)
    }

    pub fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }

    /// Longest a single query can spend in port calls: retrieval embedding,
    /// store query, rerank embedding (unless reused) and generation.
    pub fn query_budget_secs(&self, reuse_query_embedding: bool) -> u64 {
        let embeddings = if reuse_query_embedding { 1 } else { 2 };
        self.embedding_secs * embeddings + self.vector_store_secs + self.generation_secs
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSettings {
    /// SQLite file; relative paths resolve against the workspace
    pub path: Option<PathBuf>,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    pub bind: String,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            request_timeout_secs: 240,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    rag: Option<RagConfig>,
    timeouts: Option<PortTimeouts>,
    index: Option<IndexSettings>,
    server: Option<ServerSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            rag: RagConfig::default(),
            timeouts: PortTimeouts::default(),
            index: IndexSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `ASSIST_WORKSPACE`: Override workspace path
    /// - `ASSIST_CONFIG`: Path to config file
    /// - `OLLAMA_HOST` / `ASSIST_LLM_ENDPOINT`: Ollama base URL
    /// - `ASSIST_LLM_MODEL`, `ASSIST_EMBED_MODEL`, `ASSIST_EMBED_PROVIDER`
    /// - `ASSIST_TOP_K`, `ASSIST_RERANK_TOP_K`, `ASSIST_MAX_CONTEXT_CHARS`,
    ///   `ASSIST_RAG_SCORE_THRESHOLD`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use assist_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("ASSIST_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("ASSIST_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.assist_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        config.apply_env(|key| std::env::var(key).ok())?;

        config.log_level = std::env::var("RUST_LOG").ok().or(config.log_level);

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merge_file(config_file))
    }

    fn merge_file(&self, file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(llm) = file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = file.embedding {
            result.embedding = embedding;
        }
        if let Some(rag) = file.rag {
            result.rag = rag;
        }
        if let Some(timeouts) = file.timeouts {
            result.timeouts = timeouts;
        }
        if let Some(index) = file.index {
            result.index = index;
        }
        if let Some(server) = file.server {
            result.server = server;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        result
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("ASSIST_LLM_ENDPOINT").or_else(|| lookup("OLLAMA_HOST")) {
            self.llm.endpoint = endpoint;
        }
        if let Some(model) = lookup("ASSIST_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(provider) = lookup("ASSIST_EMBED_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Some(model) = lookup("ASSIST_EMBED_MODEL") {
            self.embedding.model = model;
        }
        if let Some(value) = lookup("ASSIST_TOP_K") {
            self.rag.top_k = parse_env("ASSIST_TOP_K", &value)?;
        }
        if let Some(value) = lookup("ASSIST_RERANK_TOP_K") {
            self.rag.rerank_top_k = parse_env("ASSIST_RERANK_TOP_K", &value)?;
        }
        if let Some(value) = lookup("ASSIST_MAX_CONTEXT_CHARS") {
            self.rag.max_context_chars = parse_env("ASSIST_MAX_CONTEXT_CHARS", &value)?;
        }
        if let Some(value) = lookup("ASSIST_RAG_SCORE_THRESHOLD") {
            self.rag.rag_score_threshold = parse_env("ASSIST_RAG_SCORE_THRESHOLD", &value)?;
        }
        if let Some(path) = lookup("ASSIST_INDEX_PATH") {
            self.index.path = Some(PathBuf::from(path));
        }
        if let Some(bind) = lookup("ASSIST_BIND") {
            self.server.bind = bind;
        }
        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the file.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> AppResult<Self> {
        if let Some(workspace) = workspace {
            self.workspace = workspace;

            // A workspace flag brings that workspace's config file with it
            let workspace_config = self.assist_dir().join("config.yaml");
            if config_file.is_none() && self.config_file.is_none() && workspace_config.exists() {
                self = self.merge_yaml(&workspace_config)?;
                self.apply_env(|key| std::env::var(key).ok())?;
            }
        }

        if let Some(config_file) = config_file {
            self = self.merge_yaml(&config_file)?;
            self.apply_env(|key| std::env::var(key).ok())?;
            self.config_file = Some(config_file);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        Ok(self)
    }

    /// Get the path to the .assist directory.
    pub fn assist_dir(&self) -> PathBuf {
        self.workspace.join(".assist")
    }

    /// Ensure the .assist directory exists.
    pub fn ensure_assist_dir(&self) -> AppResult<()> {
        let dir = self.assist_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .assist directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolved SQLite index path.
    pub fn index_path(&self) -> PathBuf {
        match &self.index.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.workspace.join(path),
            None => self.assist_dir().join("index.db"),
        }
    }

    /// Endpoint used by the embedding adapter.
    pub fn embedding_endpoint(&self) -> &str {
        self.embedding
            .endpoint
            .as_deref()
            .unwrap_or(&self.llm.endpoint)
    }

    /// Validate the whole configuration. Call once at startup.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }

        if self.timeouts.embedding_secs == 0
            || self.timeouts.vector_store_secs == 0
            || self.timeouts.generation_secs == 0
        {
            return Err(AppError::Config(
                "Port timeouts must be at least one second".to_string(),
            ));
        }

        let query_budget = self.timeouts.query_budget_secs(self.rag.reuse_query_embedding);
        if self.server.request_timeout_secs <= query_budget {
            return Err(AppError::Config(format!(
                "server.requestTimeoutSecs ({}) must exceed the port deadlines of one query ({}s)",
                self.server.request_timeout_secs, query_budget
            )));
        }

        self.rag.validate()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid value for {}: {:?}", key, value)))
}
