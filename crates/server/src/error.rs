//! Unified error handling for the API.
//!
//! Every failure leaves the server as `{ "success": false, "message": ..., "errors"?: [...] }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use techmorpho_core::api::{ApiResponse, FieldError};

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, MIN_PASSWORD_LENGTH};

/// Message returned for every unclassified server fault.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Token signing or password hashing failed.
    #[error("Auth error: {0}")]
    Auth(AuthError),

    /// One or more request fields are invalid.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller lacks permission.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client, including uniqueness conflicts.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// A validation error on a single field.
    pub fn field(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Map a repository `NotFound` to a 404 with `message`, leaving other
    /// errors to the default mapping.
    pub fn not_found_as(message: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |err| match err {
            RepositoryError::NotFound => Self::NotFound(message.to_owned()),
            other => other.into(),
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Not found".to_owned()),
            RepositoryError::Conflict(message) => Self::BadRequest(message),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::PasswordTooShort { .. } => Self::field(
                "password",
                &format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ),
            AuthError::AdminExists => Self::BadRequest(err.to_string()),
            AuthError::RegistrationDisabled => Self::Forbidden(err.to_string()),
            AuthError::InvalidEmail(_) => Self::field("email", "Valid email is required"),
            AuthError::Repository(inner) => inner.into(),
            AuthError::Token(_) | AuthError::Hashing(_) | AuthError::Task(_) => Self::Auth(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match self {
            Self::Database(_) | Self::Auth(_) => ApiResponse::error(INTERNAL_MESSAGE, Vec::new()),
            Self::Validation(errors) => ApiResponse::error("Validation failed", errors),
            Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::BadRequest(message) => ApiResponse::error(message, Vec::new()),
        };

        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from a token subject.
pub fn set_sentry_user(admin_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_owned()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("Service not found".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("No token provided".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("Admin access required".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::field("title", "Title is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_maps_to_bad_request() {
        let err: AppError =
            RepositoryError::Conflict("Service with this slug already exists".to_owned()).into();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("slug")));
    }

    #[test]
    fn test_not_found_as_uses_message() {
        let err = AppError::not_found_as("Enquiry not found")(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "Enquiry not found");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::RegistrationDisabled),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::PasswordTooShort { min: 6 }),
            AppError::Validation(ref errors) if errors[0].field == "password"
        ));
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "unknown role in admins.role".to_owned(),
        ));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let (_, body) = body_json(AppError::Validation(vec![
            FieldError::new("name", "Name is required"),
            FieldError::new("email", "Valid email is required"),
        ]))
        .await;
        assert_eq!(body["errors"][1]["field"], "email");
        assert_eq!(body["errors"][0]["message"], "Name is required");
    }
}
