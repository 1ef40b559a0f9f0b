//! API route handlers
//!
//! - `health`: Liveness check
//! - `query`: Query answering

pub mod health;
pub mod query;

use crate::error::ServerError;

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
