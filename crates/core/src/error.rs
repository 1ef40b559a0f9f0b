//! Error types for Assist.
//!
//! This module defines a unified error enum covering configuration, port
//! (embedding, vector store, generation), knowledge base, prompt and I/O
//! failures. Low-confidence answers are not errors and never appear here.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// External capability consumed by the query pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Port {
    Embedding,
    VectorStore,
    Generation,
}

impl Port {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedding => "embedding",
            Self::VectorStore => "vector_store",
            Self::Generation => "generation",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for Assist.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or missing settings. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A port was unreachable, failed, or timed out.
    #[error("{port} port unavailable: {reason}")]
    PortUnavailable { port: Port, reason: String },

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Knowledge base and ingestion errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Shorthand for a `PortUnavailable` error.
    pub fn port(port: Port, reason: impl Into<String>) -> Self {
        AppError::PortUnavailable {
            port,
            reason: reason.into(),
        }
    }

    /// Whether this error came from an external port.
    pub fn is_port_failure(&self) -> bool {
        matches!(self, AppError::PortUnavailable { .. })
    }

    /// The failing port, if any.
    pub fn failed_port(&self) -> Option<Port> {
        match self {
            AppError::PortUnavailable { port, .. } => Some(*port),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_display() {
        let err = AppError::port(Port::VectorStore, "connection refused");
        assert_eq!(
            err.to_string(),
            "vector_store port unavailable: connection refused"
        );
        assert!(err.is_port_failure());
        assert_eq!(err.failed_port(), Some(Port::VectorStore));
    }

    #[test]
    fn test_non_port_errors() {
        let err = AppError::Config("bad threshold".to_string());
        assert!(!err.is_port_failure());
        assert_eq!(err.failed_port(), None);
    }

    #[test]
    fn test_port_serializes_snake_case() {
        let json = serde_json::to_string(&Port::VectorStore).unwrap();
        assert_eq!(json, "\"vector_store\"");
    }
}
