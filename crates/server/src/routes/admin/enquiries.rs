//! Admin enquiry management.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use techmorpho_core::api::{ApiResponse, Pagination};
use techmorpho_core::{Enquiry, EnquiryId, EnquiryStats, EnquiryStatus};

use crate::db::EnquiryRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::openapi::MessageResponse;
use crate::routes::ApiResult;
use crate::state::AppState;
use crate::validation::{EnquiryListQuery, PathId, StatusRequest, ValidatedJson};

const NOT_FOUND: &str = "Enquiry not found";

/// Newest enquiries first, one page at a time.
///
/// GET /api/admin/enquiries?status=&page=&limit=
///
/// # Errors
///
/// Returns 400 for an unknown `status`.
#[utoipa::path(
    get,
    path = "/api/admin/enquiries",
    tag = "Admin Enquiries",
    operation_id = "admin_list_enquiries",
    params(
        ("status" = Option<EnquiryStatus>, Query, description = "Only enquiries in this status"),
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("limit" = Option<u32>, Query, description = "Page size, at most 100")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Newest first, with pagination", body = ApiResponse<Vec<Enquiry>>),
        (status = 400, description = "Validation failed", body = MessageResponse)
    )
)]
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<EnquiryListQuery>,
) -> ApiResult<Vec<Enquiry>> {
    let page = query.resolve()?;
    let (enquiries, total) = EnquiryRepository::new(state.pool())
        .list(page.status, page.page, page.limit)
        .await?;

    Ok(Json(
        ApiResponse::ok(enquiries).with_pagination(Pagination::new(page.page, page.limit, total)),
    ))
}

/// GET /api/admin/enquiries/{id}
#[utoipa::path(
    get,
    path = "/api/admin/enquiries/{id}",
    tag = "Admin Enquiries",
    operation_id = "admin_get_enquiry",
    params(("id" = i32, Path, description = "Enquiry id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The enquiry", body = ApiResponse<Enquiry>),
        (status = 404, description = "Enquiry not found", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(enquiry_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    PathId(id): PathId<EnquiryId>,
) -> ApiResult<Enquiry> {
    let enquiry = EnquiryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;

    Ok(Json(ApiResponse::ok(enquiry)))
}

/// PUT /api/admin/enquiries/{id}/status
///
/// # Errors
///
/// Returns 400 for an unknown status and 404 for an unknown id.
#[utoipa::path(
    put,
    path = "/api/admin/enquiries/{id}/status",
    tag = "Admin Enquiries",
    params(("id" = i32, Path, description = "Enquiry id")),
    request_body = StatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Enquiry>),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 404, description = "Enquiry not found", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(admin = %admin.email, enquiry_id = %id, status = %update.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathId(id): PathId<EnquiryId>,
    ValidatedJson(update): ValidatedJson<StatusRequest>,
) -> ApiResult<Enquiry> {
    let enquiry = EnquiryRepository::new(state.pool())
        .update_status(id, &update)
        .await
        .map_err(AppError::not_found_as(NOT_FOUND))?;

    Ok(Json(ApiResponse::ok(enquiry)))
}

/// DELETE /api/admin/enquiries/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/enquiries/{id}",
    tag = "Admin Enquiries",
    operation_id = "admin_delete_enquiry",
    params(("id" = i32, Path, description = "Enquiry id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enquiry deleted", body = MessageResponse),
        (status = 404, description = "Enquiry not found", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(admin = %admin.email, enquiry_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathId(id): PathId<EnquiryId>,
) -> ApiResult<()> {
    EnquiryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::not_found_as(NOT_FOUND))?;

    Ok(Json(ApiResponse::message("Enquiry deleted successfully")))
}

/// GET /api/admin/enquiries/stats/overview
#[utoipa::path(
    get,
    path = "/api/admin/enquiries/stats/overview",
    tag = "Admin Enquiries",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Counts per status", body = ApiResponse<EnquiryStats>))
)]
#[instrument(skip_all)]
pub async fn stats(State(state): State<AppState>, _admin: RequireAdmin) -> ApiResult<EnquiryStats> {
    let stats = EnquiryRepository::new(state.pool()).stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}
