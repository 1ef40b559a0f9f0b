//! HTTP API for the Assist query pipeline.
//!
//! # API Endpoints
//!
//! - `GET /health` - Liveness check with configured model names
//! - `GET /query?q=...` - Answer a query
//! - `POST /query` - Answer a query sent as `{"query": "..."}`
//!
//! Answers are `{"answer": ..., "sources": [{"source": ..., "score": ...}]}`.
//! A port outage returns 503 with `{"error": ..., "port": ...}`.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
