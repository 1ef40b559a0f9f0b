//! Embedding port.
//!
//! Turns text into fixed-length vectors. The same provider must be used at
//! ingestion and query time so scores stay comparable.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
