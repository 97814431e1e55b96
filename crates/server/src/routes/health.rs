//! Health check endpoints.

use axum::{Json, extract::State, http::StatusCode};

use techmorpho_core::api::HealthStatus;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// `GET /api/health`
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "API is running", body = HealthStatus))
)]
pub async fn api_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_owned(),
        message: "TechMorpho API is running".to_owned(),
    })
}
