//! Public settings and page SEO.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use techmorpho_core::api::ApiResponse;
use techmorpho_core::{PUBLIC_CATEGORIES, PageSeo, SettingsMap, is_public_category};

use super::ApiResult;
use crate::db::SettingsRepository;
use crate::db::settings::decode_all;
use crate::openapi::{MapResponse, MessageResponse};
use crate::state::AppState;
use crate::validation::{CategoryQuery, PathQuery};

/// Decoded settings from the public categories.
///
/// GET /api/settings?category=
///
/// A category outside the public set yields an empty map.
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    operation_id = "list_public_settings",
    params(("category" = Option<String>, Query, description = "Restrict to one public category")),
    responses((status = 200, description = "Decoded public settings", body = MapResponse))
)]
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<SettingsMap> {
    let repo = SettingsRepository::new(state.pool());

    let settings = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) if is_public_category(category) => repo.list_decoded(Some(category)).await?,
        Some(_) => SettingsMap::new(),
        None => decode_all(repo.list_in_categories(&PUBLIC_CATEGORIES).await?),
    };

    Ok(Json(ApiResponse::ok(settings)))
}

/// SEO record for one page; unset pages get the empty record.
///
/// GET /api/settings/page-seo?path=
///
/// # Errors
///
/// Returns 400 when `path` is missing.
#[utoipa::path(
    get,
    path = "/api/settings/page-seo",
    tag = "Settings",
    operation_id = "get_page_seo",
    params(("path" = String, Query, description = "Page path, e.g. /about")),
    responses(
        (status = 200, description = "SEO record, empty when unset", body = ApiResponse<PageSeo>),
        (status = 400, description = "Missing path", body = MessageResponse)
    )
)]
#[instrument(skip(state))]
pub async fn page_seo(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<PageSeo> {
    let path = query.required()?;
    let seo = SettingsRepository::new(state.pool()).page_seo(&path).await?;
    Ok(Json(ApiResponse::ok(seo)))
}
