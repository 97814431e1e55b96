//! Bearer-token authentication for admin routes.
//!
//! A request moves through: token present, token valid, role sufficient.
//! The first failed step short-circuits with 401 or 403; there is no
//! refresh flow.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use techmorpho_core::api::ApiResponse;
use techmorpho_core::{AdminId, AdminRole};

use crate::error::set_sentry_user;
use crate::state::AppState;

/// The admin behind a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAdmin {
    pub id: Option<AdminId>,
    pub email: String,
    pub role: AdminRole,
}

/// Extractor that requires a valid token with an admin role.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> String {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Why a request was refused by [`RequireAdmin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization` header, or an empty token.
    MissingToken,
    /// Bad signature, malformed, or expired.
    InvalidToken,
    /// Valid token whose role may not manage the site.
    Forbidden,
}

impl AuthRejection {
    /// Message sent to the client.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingToken => "No token provided",
            Self::InvalidToken => "Invalid or expired token",
            Self::Forbidden => "Admin access required",
        }
    }

    const fn status(self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ApiResponse::error(self.message(), Vec::new())),
        )
            .into_response()
    }
}

/// The token carried by an `Authorization` header value.
///
/// The `Bearer ` prefix is optional; a header without it is taken as the
/// raw token.
fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthRejection::MissingToken)?;

        let claims = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected admin token");
            AuthRejection::InvalidToken
        })?;

        let role = claims
            .role
            .parse::<AdminRole>()
            .ok()
            .filter(AdminRole::can_manage)
            .ok_or_else(|| {
                tracing::info!(sub = %claims.sub, role = %claims.role, "Token role may not manage the site");
                AuthRejection::Forbidden
            })?;

        set_sentry_user(&claims.sub, Some(&claims.email));

        Ok(Self(CurrentAdmin {
            id: claims.admin_id(),
            email: claims.email,
            role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AuthRejection::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
