//! `OpenAPI` document and Swagger UI.
//!
//! - `/api-docs` - Interactive Swagger UI
//! - `/openapi.json` - Raw `OpenAPI` 3.1 JSON document

use axum::Router;
use serde_json::Value;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::server::Server;
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use techmorpho_core::api::FieldError;
use techmorpho_core::{Enquiry, PageSeo, Service, Setting, SitePage};

use crate::routes::{admin, contact, health, services, settings};
use crate::validation::{
    ContactRequest, LoginRequest, RegisterRequest, ServiceRequest, SettingRequest, StatusRequest,
};

/// Name of the bearer scheme referenced by admin operations.
pub const BEARER_AUTH: &str = "bearer_auth";

/// Envelope carrying only a message: deletes and every error response.
#[derive(Debug, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    /// Present on validation failures.
    pub errors: Vec<FieldError>,
}

/// Envelope whose `data` is an object of decoded settings keyed by setting key.
#[derive(Debug, ToSchema)]
pub struct MapResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_AUTH,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// `OpenAPI` documentation for the TechMorpho API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TechMorpho API",
        version = "1.0.0",
        description = "API documentation for TechMorpho website backend",
        license(name = "MIT OR Apache-2.0"),
        contact(name = "TechMorpho Support", email = "info@techmorpho.in")
    ),
    paths(
        health::api_health,
        contact::submit,
        services::index,
        services::show,
        settings::index,
        settings::page_seo,
        admin::auth::login,
        admin::auth::register,
        admin::services::index,
        admin::services::show,
        admin::services::create,
        admin::services::update,
        admin::services::delete,
        admin::enquiries::index,
        admin::enquiries::stats,
        admin::enquiries::show,
        admin::enquiries::update_status,
        admin::enquiries::delete,
        admin::settings::index,
        admin::settings::upsert,
        admin::settings::pages,
        admin::settings::page_seo,
        admin::settings::save_page_seo,
        admin::settings::generate_sitemap,
    ),
    components(schemas(
        Service,
        Enquiry,
        Setting,
        PageSeo,
        SitePage,
        MessageResponse,
        MapResponse,
        LoginRequest,
        RegisterRequest,
        ContactRequest,
        ServiceRequest,
        StatusRequest,
        SettingRequest,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Contact", description = "Public contact form"),
        (name = "Services", description = "Public service catalogue"),
        (name = "Settings", description = "Public settings and page SEO"),
        (name = "Admin Auth", description = "Admin login and registration"),
        (name = "Admin Services", description = "Service management"),
        (name = "Admin Enquiries", description = "Enquiry management"),
        (name = "Admin Settings", description = "Settings, page SEO and sitemap management"),
    )
)]
pub struct ApiDoc;

/// The document with `base_url` as its only server.
#[must_use]
pub fn api_doc(base_url: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(base_url)]);
    doc
}

/// Swagger UI at `/api-docs`, serving the document from `/openapi.json`.
pub fn routes<S: Clone + Send + Sync + 'static>(base_url: &str) -> Router<S> {
    Router::new().merge(SwaggerUi::new("/api-docs").url("/openapi.json", api_doc(base_url)))
}
