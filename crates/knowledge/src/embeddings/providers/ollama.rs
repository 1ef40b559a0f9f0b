//! Ollama embedding provider.
//!
//! Calls Ollama's `/api/embeddings` endpoint with models like `nomic-embed-text`.
//! Ollama has no batch endpoint, so batches are embedded sequentially.
//!
//! # Example
//! ```no_run
//! use assist_knowledge::embeddings::providers::OllamaProvider;
//! use assist_knowledge::embeddings::EmbeddingProvider;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OllamaProvider::new(
//!     "http://localhost:11434",
//!     "nomic-embed-text",
//!     768,
//!     Duration::from_secs(30),
//! )?;
//! let embedding = provider.embed("What is the KYC policy?").await?;
//! assert_eq!(embedding.len(), 768);
//! # Ok(())
//! # }
//! ```

use crate::embeddings::EmbeddingProvider;
use assist_core::{AppError, AppResult, Port};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Maximum attempts per text before the port is reported unavailable
const MAX_ATTEMPTS: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Ollama embedding provider using the local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// A failed attempt and whether repeating it could succeed.
#[derive(Debug)]
struct AttemptError {
    error: AppError,
    retryable: bool,
}

impl AttemptError {
    fn transient(message: String) -> Self {
        Self {
            error: AppError::port(Port::Embedding, message),
            retryable: true,
        }
    }

    fn permanent(error: AppError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

/// Server-side and rate-limit failures may clear up; other client errors will not.
fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

impl OllamaProvider {
    /// Create a provider. No request is made until the first embedding.
    pub fn new(
        base_url: &str,
        model: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client for Ollama: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_with_retries(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.embed_once(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) if e.retryable && attempt < MAX_ATTEMPTS => {
                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, MAX_ATTEMPTS, backoff_ms, e.error
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => return Err(e.error),
            }
        }
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>, AttemptError> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AttemptError::transient(format!("Failed to reach Ollama at {}: {}", self.base_url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);

            let message = format!("Ollama API error ({}): {}", status, message);
            return Err(if is_retryable_status(status) {
                AttemptError::transient(message)
            } else {
                AttemptError::permanent(AppError::port(Port::Embedding, message))
            });
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AttemptError::permanent(AppError::port(
                Port::Embedding,
                format!("Failed to parse Ollama response: {}", e),
            ))
        })?;

        check_dimensions(&body.embedding, self.dimensions).map_err(AttemptError::permanent)?;
        Ok(body.embedding)
    }
}

fn check_dimensions(embedding: &[f32], expected: usize) -> AppResult<()> {
    if embedding.len() != expected {
        return Err(AppError::port(
            Port::Embedding,
            format!(
                "Unexpected embedding dimensions: got {}, expected {}",
                embedding.len(),
                expected
            ),
        ));
    }
    Ok(())
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                warn!("Empty text at index {}, using zero vector", i);
                embeddings.push(vec![0.0; self.dimensions]);
                continue;
            }

            embeddings.push(self.embed_with_retries(text).await?);
        }

        Ok(embeddings)
    }
}
