//! Service catalogue repository.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use techmorpho_core::{HeroBanner, Service, ServiceId, ServiceInput, ServiceSection, non_empty};

use super::RepositoryError;

/// Message returned when a slug is already taken.
pub const DUPLICATE_SLUG: &str = "Service with this slug already exists";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: i32,
    title: String,
    slug: String,
    description: String,
    icon: Option<String>,
    features: JsonValue,
    tag: Option<String>,
    category: Option<String>,
    featured: bool,
    sort_order: i32,
    active: bool,
    show_in_nav: bool,
    content: Option<String>,
    sections: JsonValue,
    hero_banner: Option<JsonValue>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ServiceRow> for Service {
    type Error = RepositoryError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: serde_json::Error| {
            RepositoryError::DataCorruption(format!("service {} has invalid {field}: {e}", row.id))
        };

        let features: Vec<String> =
            serde_json::from_value(row.features.clone()).map_err(|e| corrupt("features", e))?;
        let sections: Vec<ServiceSection> =
            serde_json::from_value(row.sections.clone()).map_err(|e| corrupt("sections", e))?;
        let hero_banner: Option<HeroBanner> = row
            .hero_banner
            .clone()
            .filter(|value| !value.is_null())
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| corrupt("hero_banner", e))?;

        Ok(Self {
            id: ServiceId::new(row.id),
            title: row.title,
            slug: row.slug,
            description: row.description,
            icon: row.icon,
            features,
            tag: row.tag,
            category: row.category,
            featured: row.featured,
            order: row.sort_order,
            active: row.active,
            show_in_nav: row.show_in_nav,
            content: row.content,
            sections,
            hero_banner,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SERVICE_COLUMNS: &str = "id, title, slug, description, icon, features, tag, category, \
     featured, sort_order, active, show_in_nav, content, sections, hero_banner, \
     created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for the service catalogue.
pub struct ServiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepository<'a> {
    /// Create a new service repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active services by ascending `order`, ties in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a JSON column is invalid.
    pub async fn list_active(&self) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services
             WHERE active = TRUE
             ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// All services, active or not, in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a JSON column is invalid.
    pub async fn list_all(&self) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a service by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an active service by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_slug(&self, slug: &str) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE slug = $1 AND active = TRUE"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a service, applying defaults for omitted optional fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: &ServiceInput) -> Result<Service, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "INSERT INTO services
                 (title, slug, description, icon, features, tag, category, featured,
                  sort_order, active, show_in_nav, content, sections, hero_banner)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(non_empty(input.icon.as_deref()))
        .bind(Json(input.features.clone().unwrap_or_default()))
        .bind(non_empty(input.tag.as_deref()))
        .bind(non_empty(input.category.as_deref()))
        .bind(input.featured.unwrap_or(false))
        .bind(input.order.unwrap_or(0))
        .bind(input.active.unwrap_or(true))
        .bind(input.show_in_nav.unwrap_or(true))
        .bind(non_empty(input.content.as_deref()))
        .bind(Json(input.sections.clone().unwrap_or_default()))
        .bind(input.hero_banner.clone().map(Json))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_SLUG))?;

        row.try_into()
    }

    /// Update a service. Omitted optional fields keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service does not exist.
    /// Returns `RepositoryError::Conflict` if the new slug belongs to another service.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn update(
        &self,
        id: ServiceId,
        input: &ServiceInput,
    ) -> Result<Service, RepositoryError> {
        let mut service = self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)?;
        service.apply(input);

        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "UPDATE services
             SET title = $2, slug = $3, description = $4, icon = $5, features = $6,
                 tag = $7, category = $8, featured = $9, sort_order = $10, active = $11,
                 show_in_nav = $12, content = $13, sections = $14, hero_banner = $15,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(id)
        .bind(&service.title)
        .bind(&service.slug)
        .bind(&service.description)
        .bind(&service.icon)
        .bind(Json(&service.features))
        .bind(&service.tag)
        .bind(&service.category)
        .bind(service.featured)
        .bind(service.order)
        .bind(service.active)
        .bind(service.show_in_nav)
        .bind(&service.content)
        .bind(Json(&service.sections))
        .bind(service.hero_banner.as_ref().map(Json))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_SLUG))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ServiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row() -> ServiceRow {
        let now = Utc::now();
        ServiceRow {
            id: 4,
            title: "SEO".to_owned(),
            slug: "seo".to_owned(),
            description: "Rank higher".to_owned(),
            icon: None,
            features: json!(["Audit", "Backlinks"]),
            tag: None,
            category: None,
            featured: false,
            sort_order: 2,
            active: true,
            show_in_nav: true,
            content: None,
            sections: json!([{"id": "s1", "title": "Why", "content": "Because"}]),
            hero_banner: Some(json!({"title": "Grow", "showBreadcrumb": true})),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_conversion() {
        let service = Service::try_from(row()).unwrap();
        assert_eq!(service.order, 2);
        assert_eq!(service.features, vec!["Audit".to_owned(), "Backlinks".to_owned()]);
        assert_eq!(service.sections.len(), 1);
        assert_eq!(
            service.hero_banner.unwrap().show_breadcrumb,
            Some(true)
        );
    }

    #[test]
    fn test_row_conversion_rejects_bad_features() {
        let mut bad = row();
        bad.features = json!("not a list");
        assert!(matches!(
            Service::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_null_hero_banner_is_none() {
        let mut r = row();
        r.hero_banner = Some(JsonValue::Null);
        assert!(Service::try_from(r).unwrap().hero_banner.is_none());
    }
}
