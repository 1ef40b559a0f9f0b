//! Server initialization and routing
//!
//! Builds the axum router, applies the middleware stack and serves until
//! Ctrl+C or SIGTERM.

use crate::error::{ServerError, ServerResult};
use crate::routes::{health, not_found, query};
use crate::state::ServerState;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the axum router with all routes and middleware.
///
/// Middleware (outermost last): timeout, CORS, request tracing.
pub fn build_router(state: Arc<ServerState>) -> ServerResult<Router> {
    let cors = cors_layer(&state.settings.cors_origins)?;
    let timeout = Duration::from_secs(state.settings.request_timeout_secs);

    Ok(Router::new()
        .route("/health", get(health::health_check))
        .route("/query", get(query::query_get).post(query::query_post))
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> ServerResult<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| ServerError::Config(format!("Invalid CORS origin '{}': {}", origin, e)))
        })
        .collect::<ServerResult<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}

/// Serve the API on the configured bind address until shutdown.
pub async fn start_server(state: ServerState) -> ServerResult<()> {
    let addr: SocketAddr = state.settings.bind.parse().map_err(|e| {
        ServerError::Config(format!("Invalid bind address '{}': {}", state.settings.bind, e))
    })?;

    tracing::info!(
        llm_model = %state.llm_model,
        embed_model = %state.embed_model,
        "Starting Assist server on {}",
        addr
    );
    tracing::info!(
        "Timeout: {}s, CORS origins: {:?}",
        state.settings.request_timeout_secs,
        state.settings.cors_origins
    );

    let app = build_router(Arc::new(state))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_rejects_invalid_origin() {
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
        assert!(matches!(
            cors_layer(&["bad\norigin".to_string()]),
            Err(ServerError::Config(_))
        ));
    }
}
