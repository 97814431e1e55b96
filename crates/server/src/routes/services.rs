//! Public service catalogue.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use techmorpho_core::Service;
use techmorpho_core::api::ApiResponse;

use super::ApiResult;
use crate::db::ServiceRepository;
use crate::error::AppError;
use crate::openapi::MessageResponse;
use crate::state::AppState;

/// Active services in display order.
///
/// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    operation_id = "list_services",
    responses((status = 200, description = "Active services", body = ApiResponse<Vec<Service>>))
)]
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> ApiResult<Vec<Service>> {
    let services = ServiceRepository::new(state.pool()).list_active().await?;
    Ok(Json(ApiResponse::ok(services)))
}

/// One active service by slug.
///
/// GET /api/services/{slug}
///
/// # Errors
///
/// Returns 404 if no active service has this slug.
#[utoipa::path(
    get,
    path = "/api/services/{slug}",
    tag = "Services",
    operation_id = "get_service",
    params(("slug" = String, Path, description = "Service slug")),
    responses(
        (status = 200, description = "The service", body = ApiResponse<Service>),
        (status = 404, description = "Service not found", body = MessageResponse)
    )
)]
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Service> {
    let service = ServiceRepository::new(state.pool())
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_owned()))?;

    Ok(Json(ApiResponse::ok(service)))
}
