//! LLM provider factory.
//!
//! Creates the generation client named by configuration.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use assist_core::config::LlmSettings;
use assist_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the configured provider.
///
/// # Arguments
/// * `settings` - Provider name and endpoint
/// * `timeout` - HTTP deadline for a single completion
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or the client
/// cannot be built.
pub fn create_client(settings: &LlmSettings, timeout: Duration) -> AppResult<Arc<dyn LlmClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let client = OllamaClient::with_timeout(settings.endpoint.as_str(), timeout)?;
            tracing::debug!("Created Ollama client for {}", settings.endpoint);
            Ok(Arc::new(client))
        }
        other => Err(AppError::Config(format!("Unknown LLM provider: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let settings = LlmSettings::default();
        let client = create_client(&settings, Duration::from_secs(5)).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let settings = LlmSettings {
            endpoint: "http://localhost:8080".to_string(),
            ..Default::default()
        };
        assert!(create_client(&settings, Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        let settings = LlmSettings {
            provider: "unknown".to_string(),
            ..Default::default()
        };
        match create_client(&settings, Duration::from_secs(5)) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown LLM provider")),
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
