//! Liveness and readiness probes.

use axum::extract::State;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the document store answers before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> Result<&'static str> {
    state.store().ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        AppError::Unavailable
    })?;
    Ok("ok")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{get, memory_state};

    #[tokio::test]
    async fn test_health_and_readiness() {
        let (state, _) = memory_state();

        let (status, _) = get(state.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = get(state, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }
}
