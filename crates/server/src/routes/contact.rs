//! Public contact form.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use techmorpho_core::EnquiryReceipt;
use techmorpho_core::api::ApiResponse;

use crate::db::EnquiryRepository;
use crate::error::AppError;
use crate::openapi::MessageResponse;
use crate::state::AppState;
use crate::validation::{ContactRequest, ValidatedJson};

/// Submit an enquiry.
///
/// POST /api/contact
///
/// # Errors
///
/// Returns 400 with field errors for missing or malformed fields.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Enquiry stored", body = ApiResponse<EnquiryReceipt>),
        (status = 400, description = "Validation failed", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(service = %enquiry.service))]
pub async fn submit(
    State(state): State<AppState>,
    ValidatedJson(enquiry): ValidatedJson<ContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EnquiryReceipt>>), AppError> {
    let enquiry = EnquiryRepository::new(state.pool()).create(&enquiry).await?;
    tracing::info!(enquiry_id = %enquiry.id, "Contact form submitted");

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::ok(EnquiryReceipt::from(&enquiry))
                .with_message("Contact form submitted successfully"),
        ),
    ))
}
