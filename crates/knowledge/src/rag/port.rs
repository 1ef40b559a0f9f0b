//! Deadline enforcement for outbound port calls.

use assist_core::{AppError, AppResult, Port};
use std::future::Future;
use std::time::Duration;

/// Await a port call, mapping an elapsed deadline or any failure to
/// [`AppError::PortUnavailable`] for `port`.
pub async fn call_port<T, F>(port: Port, limit: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) if e.failed_port() == Some(port) => Err(e),
        Ok(Err(e)) => Err(AppError::port(port, e.to_string())),
        Err(_) => {
            tracing::warn!(port = %port, "Port call timed out after {:?}", limit);
            Err(AppError::port(
                port,
                format!("timed out after {}ms", limit.as_millis()),
            ))
        }
    }
}
