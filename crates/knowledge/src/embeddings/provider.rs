//! Embedding provider trait and factory.

use assist_core::config::EmbeddingSettings;
use assist_core::{AppError, AppResult, Port};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::port(Port::Embedding, "No embedding returned"))
    }
}

/// Create an embedding provider based on configuration.
///
/// `endpoint` is the resolved Ollama base URL; it is ignored by the mock provider.
pub fn create_provider(
    settings: &EmbeddingSettings,
    endpoint: &str,
    timeout: Duration,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "mock" => Ok(Arc::new(super::providers::MockProvider::new(
            settings.dimensions,
        ))),

        "ollama" => {
            let provider = super::providers::OllamaProvider::new(
                endpoint,
                &settings.model,
                settings.dimensions,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: mock, ollama",
            settings.provider
        ))),
    }
}
