//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database)
//! GET  /api/health                      - API status envelope
//! GET  /sitemap.xml                     - Stored or fallback sitemap
//! GET  /api-docs                        - Swagger UI (see `crate::openapi`)
//! GET  /openapi.json                    - OpenAPI document
//!
//! # Public
//! POST /api/contact                     - Submit an enquiry
//! GET  /api/services                    - Active services
//! GET  /api/services/{slug}             - One active service
//! GET  /api/settings                    - Public settings map
//! GET  /api/settings/page-seo?path=     - SEO record for a page
//!
//! # Admin (bearer token)
//! POST /api/admin/auth/login            - Issue a token
//! POST /api/admin/auth/register         - Create an admin (when enabled)
//! /api/admin/services                   - Service CRUD
//! /api/admin/enquiries                  - Enquiry listing, status, stats
//! /api/admin/settings                   - Settings, pages, page SEO, sitemap
//! ```

pub mod admin;
pub mod contact;
pub mod health;
pub mod services;
pub mod settings;
pub mod sitemap;

use axum::{
    Json, Router,
    routing::{get, post},
};

use techmorpho_core::api::ApiResponse;

use crate::error::AppError;
use crate::state::AppState;

/// Result of a JSON handler.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Create the full application router (without global layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/health", get(health::api_health))
        .route("/sitemap.xml", get(sitemap::serve))
        .route("/api/contact", post(contact::submit))
        .route("/api/services", get(services::index))
        .route("/api/services/{slug}", get(services::show))
        .route("/api/settings", get(settings::index))
        .route("/api/settings/page-seo", get(settings::page_seo))
        .nest("/api/admin", admin::routes())
}
