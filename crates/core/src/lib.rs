//! Assist Core Library
//!
//! This crate provides the foundational utilities shared by every Assist crate:
//! - Error handling (`AppError`, `AppResult`, `Port`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, RagConfig};
pub use error::{AppError, AppResult, Port};
