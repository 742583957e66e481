//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lms_auth::JwtValidator;
use lms_service::Lms;
use serde::Serialize;

use super::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when the store answers, `degraded` otherwise.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// `GET /health`
///
/// Public. Reads the dashboard counters as a store probe and answers
/// `503` if that fails.
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health<L, V>(State(state): AppState<L, V>) -> impl IntoResponse
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    let (code, status) = match state.lms.dashboard_counts().await {
        Ok(_) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::warn!(error = %e, "Health probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
