//! Admin API, mounted under `/api/admin`.
//!
//! Everything except `auth/*` takes the `RequireAdmin` extractor.

pub mod auth;
pub mod enquiries;
pub mod services;
pub mod settings;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        // Services
        .route("/services", get(services::index).post(services::create))
        .route(
            "/services/{id}",
            get(services::show)
                .put(services::update)
                .delete(services::delete),
        )
        // Enquiries
        .route("/enquiries", get(enquiries::index))
        .route("/enquiries/stats/overview", get(enquiries::stats))
        .route(
            "/enquiries/{id}",
            get(enquiries::show).delete(enquiries::delete),
        )
        .route("/enquiries/{id}/status", put(enquiries::update_status))
        // Settings
        .route("/settings", get(settings::index).post(settings::upsert))
        .route("/settings/pages", get(settings::pages))
        .route(
            "/settings/page-seo",
            get(settings::page_seo).put(settings::save_page_seo),
        )
        .route("/settings/sitemap/generate", get(settings::generate_sitemap))
}
