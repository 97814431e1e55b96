//! Admin login and registration.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use techmorpho_core::AdminRole;
use techmorpho_core::api::{AdminSummary, ApiResponse, LoginData};

use crate::error::AppError;
use crate::openapi::MessageResponse;
use crate::routes::ApiResult;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;
use crate::validation::{LoginRequest, RegisterRequest, ValidatedJson};

/// Exchange credentials for a bearer token.
///
/// POST /api/admin/auth/login
///
/// # Errors
///
/// Returns 401 `Invalid credentials` for an unknown email, an inactive
/// account or a wrong password.
#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    tag = "Admin Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginData>),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginData> {
    let data = AuthService::new(state.pool(), state.tokens())
        .login(&credentials.email, &credentials.password)
        .await?;

    Ok(Json(ApiResponse::ok(data)))
}

/// Create an admin account with role `admin`.
///
/// POST /api/admin/auth/register
///
/// # Errors
///
/// Returns 403 unless registration is enabled, 400 for a taken email.
#[utoipa::path(
    post,
    path = "/api/admin/auth/register",
    tag = "Admin Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<AdminSummary>),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 403, description = "Registration disabled", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(email = %registration.email))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(registration): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AdminSummary>>), AppError> {
    if !state.config().registration_enabled {
        return Err(AuthError::RegistrationDisabled.into());
    }

    let admin = AuthService::new(state.pool(), state.tokens())
        .register(
            &registration.email,
            &registration.password,
            &registration.name,
            AdminRole::Admin,
        )
        .await?;

    let summary = AdminSummary {
        role: None,
        ..admin.summary()
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(summary).with_message("Admin created successfully")),
    ))
}
