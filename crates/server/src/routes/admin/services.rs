//! Admin service management.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use techmorpho_core::api::ApiResponse;
use techmorpho_core::{Service, ServiceId};

use crate::db::ServiceRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::openapi::MessageResponse;
use crate::routes::ApiResult;
use crate::state::AppState;
use crate::validation::{
    CreateServiceRequest, PathId, ServiceRequest, UpdateServiceRequest, ValidatedJson,
};

const NOT_FOUND: &str = "Service not found";

/// Every service, active or not, in display order.
///
/// GET /api/admin/services
#[utoipa::path(
    get,
    path = "/api/admin/services",
    tag = "Admin Services",
    operation_id = "admin_list_services",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every service", body = ApiResponse<Vec<Service>>),
        (status = 401, description = "Missing, invalid or expired token", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, _admin: RequireAdmin) -> ApiResult<Vec<Service>> {
    let services = ServiceRepository::new(state.pool()).list_all().await?;
    Ok(Json(ApiResponse::ok(services)))
}

/// GET /api/admin/services/{id}
#[utoipa::path(
    get,
    path = "/api/admin/services/{id}",
    tag = "Admin Services",
    operation_id = "admin_get_service",
    params(("id" = i32, Path, description = "Service id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The service", body = ApiResponse<Service>),
        (status = 404, description = "Service not found", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(service_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    PathId(id): PathId<ServiceId>,
) -> ApiResult<Service> {
    let service = ServiceRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;

    Ok(Json(ApiResponse::ok(service)))
}

/// POST /api/admin/services
///
/// # Errors
///
/// Returns 400 for invalid fields or a duplicate slug.
#[utoipa::path(
    post,
    path = "/api/admin/services",
    tag = "Admin Services",
    operation_id = "admin_create_service",
    request_body = ServiceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Service created", body = ApiResponse<Service>),
        (status = 400, description = "Validation failed", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(admin = %admin.email, slug = %input.slug))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Service>>), AppError> {
    let service = ServiceRepository::new(state.pool()).create(&input).await?;
    tracing::info!(service_id = %service.id, "Service created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(service))))
}

/// PUT /api/admin/services/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id and 400 for invalid fields or a slug
/// taken by another service.
#[utoipa::path(
    put,
    path = "/api/admin/services/{id}",
    tag = "Admin Services",
    operation_id = "admin_update_service",
    params(("id" = i32, Path, description = "Service id")),
    request_body = ServiceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Service updated", body = ApiResponse<Service>),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 404, description = "Service not found", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(admin = %admin.email, service_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathId(id): PathId<ServiceId>,
    ValidatedJson(input): ValidatedJson<UpdateServiceRequest>,
) -> ApiResult<Service> {
    let service = ServiceRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(AppError::not_found_as(NOT_FOUND))?;

    Ok(Json(ApiResponse::ok(service)))
}

/// DELETE /api/admin/services/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/services/{id}",
    tag = "Admin Services",
    operation_id = "admin_delete_service",
    params(("id" = i32, Path, description = "Service id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Service deleted", body = MessageResponse),
        (status = 404, description = "Service not found", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(admin = %admin.email, service_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathId(id): PathId<ServiceId>,
) -> ApiResult<()> {
    ServiceRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::not_found_as(NOT_FOUND))?;
    tracing::info!("Service deleted");

    Ok(Json(ApiResponse::message("Service deleted successfully")))
}
