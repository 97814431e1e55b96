//! Admin settings, page SEO and sitemap generation.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use techmorpho_core::api::{ApiResponse, SitemapData};
use techmorpho_core::{PAGE_SEO_CATEGORY, PageSeo, Setting, SettingType, SettingsMap, SitePage};

use crate::db::{ServiceRepository, SettingsRepository};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::openapi::{MapResponse, MessageResponse};
use crate::routes::ApiResult;
use crate::services::sitemap::{self, SITEMAP_CATEGORY, SITEMAP_KEY};
use crate::state::AppState;
use crate::validation::{CategoryQuery, PathQuery, SettingRequest, ValidatedJson};

/// Decoded settings, optionally restricted to one category.
///
/// GET /api/admin/settings?category=
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    tag = "Admin Settings",
    operation_id = "admin_list_settings",
    params(("category" = Option<String>, Query, description = "Restrict to one category")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Decoded settings", body = MapResponse))
)]
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<SettingsMap> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let settings = SettingsRepository::new(state.pool())
        .list_decoded(category)
        .await?;

    Ok(Json(ApiResponse::ok(settings)))
}

/// Create or replace a setting.
///
/// POST /api/admin/settings
///
/// # Errors
///
/// Returns 400 for a missing key or value or an unknown type.
#[utoipa::path(
    post,
    path = "/api/admin/settings",
    tag = "Admin Settings",
    request_body = SettingRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stored setting", body = ApiResponse<Setting>),
        (status = 400, description = "Validation failed", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(admin = %admin.email, key = %write.key, kind = %write.kind))]
pub async fn upsert(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(write): ValidatedJson<SettingRequest>,
) -> ApiResult<Setting> {
    let setting = SettingsRepository::new(state.pool())
        .upsert(&write.key, &write.raw, write.kind, &write.category)
        .await?;

    Ok(Json(ApiResponse::ok(setting)))
}

/// Pages that can carry SEO metadata: static pages, then active services.
///
/// GET /api/admin/settings/pages
#[utoipa::path(
    get,
    path = "/api/admin/settings/pages",
    tag = "Admin Settings",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Static pages, then active services", body = ApiResponse<Vec<SitePage>>))
)]
#[instrument(skip_all)]
pub async fn pages(State(state): State<AppState>, _admin: RequireAdmin) -> ApiResult<Vec<SitePage>> {
    let services = ServiceRepository::new(state.pool()).list_active().await?;

    let mut pages = SitePage::static_pages();
    pages.extend(
        services
            .iter()
            .map(|service| SitePage::for_service(&service.title, &service.slug)),
    );

    Ok(Json(ApiResponse::ok(pages)))
}

/// Query of the admin page-SEO lookup.
#[derive(Debug, Default, Deserialize)]
pub struct PageSeoQuery {
    path: Option<String>,
    category: Option<String>,
}

/// One page's SEO record, or every stored record when `path` is omitted.
///
/// GET /api/admin/settings/page-seo?path=
///
/// The listing is keyed by storage key (`page_seo_<path>`), not by path.
#[utoipa::path(
    get,
    path = "/api/admin/settings/page-seo",
    tag = "Admin Settings",
    operation_id = "admin_get_page_seo",
    params(
        ("path" = Option<String>, Query, description = "Page path; omit to list every record"),
        ("category" = Option<String>, Query, description = "Category of the listing")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One record, or records keyed by storage key", body = ApiResponse<PageSeo>)
    )
)]
#[instrument(skip_all)]
pub async fn page_seo(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<PageSeoQuery>,
) -> Result<Response, AppError> {
    let repo = SettingsRepository::new(state.pool());

    if let Some(path) = query.path.filter(|p| !p.is_empty()) {
        let seo = repo.page_seo(&path).await?;
        return Ok(Json(ApiResponse::ok(seo)).into_response());
    }

    let category = query
        .category
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| PAGE_SEO_CATEGORY.to_owned());
    let records = repo.list_page_seo(&category).await?;
    Ok(Json(ApiResponse::ok(records)).into_response())
}

/// Store the SEO record of a page.
///
/// PUT /api/admin/settings/page-seo?path=
///
/// # Errors
///
/// Returns 400 when `path` is missing.
#[utoipa::path(
    put,
    path = "/api/admin/settings/page-seo",
    tag = "Admin Settings",
    params(("path" = String, Query, description = "Page path, e.g. /about")),
    request_body = PageSeo,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Record saved", body = ApiResponse<PageSeo>),
        (status = 400, description = "Missing path", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(admin = %admin.email))]
pub async fn save_page_seo(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<PathQuery>,
    ValidatedJson(seo): ValidatedJson<PageSeo>,
) -> ApiResult<PageSeo> {
    let path = query.required()?;
    let stored = SettingsRepository::new(state.pool())
        .save_page_seo(&path, &seo)
        .await?;
    tracing::info!(key = %stored.key, "Page SEO saved");

    Ok(Json(
        ApiResponse::ok(seo).with_message("Page SEO saved successfully"),
    ))
}

/// Render the sitemap from the active services and store it.
///
/// GET /api/admin/settings/sitemap/generate
#[utoipa::path(
    get,
    path = "/api/admin/settings/sitemap/generate",
    tag = "Admin Settings",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Generated and stored sitemap", body = ApiResponse<SitemapData>))
)]
#[instrument(skip_all, fields(admin = %admin.email))]
pub async fn generate_sitemap(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> ApiResult<SitemapData> {
    let services = ServiceRepository::new(state.pool()).list_active().await?;
    let routes = sitemap::routes_for(&services);
    let xml = sitemap::render(&state.config().base_url, &routes);

    SettingsRepository::new(state.pool())
        .upsert(SITEMAP_KEY, &xml, SettingType::Text, SITEMAP_CATEGORY)
        .await?;
    tracing::info!(routes = routes.len(), "Sitemap generated");

    Ok(Json(ApiResponse::ok(SitemapData {
        sitemap: xml,
        routes: routes.len(),
    })))
}
