//! Public sitemap.

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::error::AppError;
use crate::services::sitemap::{self, SITEMAP_KEY};
use crate::state::AppState;

/// Serve the stored sitemap, or the static-pages fallback when none has
/// been generated.
///
/// GET /sitemap.xml
#[instrument(skip(state))]
pub async fn serve(State(state): State<AppState>) -> Result<Response, AppError> {
    let stored = SettingsRepository::new(state.pool())
        .get(SITEMAP_KEY)
        .await?
        .map(|setting| setting.value)
        .filter(|xml| !xml.is_empty());

    let xml = stored.unwrap_or_else(|| sitemap::fallback(&state.config().base_url));
    Ok(([(CONTENT_TYPE, "application/xml")], xml).into_response())
}
