//! Settings repository.
//!
//! Each setting is one row keyed by `key`; writes are single-row upserts, so
//! concurrent writers to the same key resolve last-write-wins.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use techmorpho_core::{
    PAGE_SEO_CATEGORY, PageSeo, Setting, SettingType, SettingValue, SettingsMap, page_seo_key,
};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SettingRow {
    key: String,
    value: String,
    kind: String,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SettingRow> for Setting {
    type Error = RepositoryError;

    fn try_from(row: SettingRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<SettingType>().map_err(|e| {
            RepositoryError::DataCorruption(format!("setting {}: {e}", row.key))
        })?;

        Ok(Self {
            key: row.key,
            value: row.value,
            kind,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SETTING_COLUMNS: &str = "key, value, type AS kind, category, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for typed settings.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a setting by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored type is unknown.
    pub async fn get(&self, key: &str) -> Result<Option<Setting>, RepositoryError> {
        let row = sqlx::query_as::<_, SettingRow>(&format!(
            "SELECT {SETTING_COLUMNS} FROM settings WHERE key = $1"
        ))
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a decoded setting value by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_value(&self, key: &str) -> Result<Option<SettingValue>, RepositoryError> {
        Ok(self.get(key).await?.map(|setting| setting.decoded()))
    }

    /// List settings in ascending key order, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Setting>, RepositoryError> {
        let rows = sqlx::query_as::<_, SettingRow>(&format!(
            "SELECT {SETTING_COLUMNS} FROM settings
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY key ASC"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List settings whose category is one of `categories`, in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_in_categories(
        &self,
        categories: &[&str],
    ) -> Result<Vec<Setting>, RepositoryError> {
        let categories: Vec<String> = categories.iter().map(|c| (*c).to_owned()).collect();
        let rows = sqlx::query_as::<_, SettingRow>(&format!(
            "SELECT {SETTING_COLUMNS} FROM settings
             WHERE category = ANY($1)
             ORDER BY key ASC"
        ))
        .bind(categories)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Decoded key/value map, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_decoded(&self, category: Option<&str>) -> Result<SettingsMap, RepositoryError> {
        Ok(decode_all(self.list(category).await?))
    }

    /// Insert or replace a setting. The raw value must already be in storage form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, value))]
    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        kind: SettingType,
        category: &str,
    ) -> Result<Setting, RepositoryError> {
        let row = sqlx::query_as::<_, SettingRow>(&format!(
            "INSERT INTO settings (key, value, type, category)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (key) DO UPDATE
             SET value = EXCLUDED.value,
                 type = EXCLUDED.type,
                 category = EXCLUDED.category,
                 updated_at = NOW()
             RETURNING {SETTING_COLUMNS}"
        ))
        .bind(key)
        .bind(value)
        .bind(kind.as_str())
        .bind(category)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Store a decoded value under its natural type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set(
        &self,
        key: &str,
        value: &SettingValue,
        category: &str,
    ) -> Result<Setting, RepositoryError> {
        self.upsert(key, &value.encode(), value.kind(), category).await
    }

    /// Insert a setting only if the key does not exist yet.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_absent(
        &self,
        key: &str,
        value: &SettingValue,
        category: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO settings (key, value, type, category)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .bind(value.encode())
        .bind(value.kind().as_str())
        .bind(category)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Page SEO
    // =========================================================================

    /// SEO record for a page path.
    ///
    /// Never fails on missing or malformed data: an unset path, or a stored
    /// record that does not decode, yields the empty [`PageSeo`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn page_seo(&self, path: &str) -> Result<PageSeo, RepositoryError> {
        let key = page_seo_key(path);
        let Some(setting) = self.get(&key).await? else {
            return Ok(PageSeo::default());
        };

        Ok(PageSeo::from_stored(setting.kind, &setting.value).unwrap_or_else(|| {
            tracing::warn!(key = %key, kind = %setting.kind, "Stored page SEO record is not decodable");
            PageSeo::default()
        }))
    }

    /// Store the SEO record for a page path.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save_page_seo(&self, path: &str, seo: &PageSeo) -> Result<Setting, RepositoryError> {
        self.upsert(
            &page_seo_key(path),
            &seo.to_stored(),
            SettingType::Json,
            PAGE_SEO_CATEGORY,
        )
        .await
    }

    /// All records in `category` keyed by storage key (not by page path).
    ///
    /// JSON records are decoded (raw text when malformed); any other type is
    /// returned as raw text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_page_seo(&self, category: &str) -> Result<SettingsMap, RepositoryError> {
        Ok(self
            .list(Some(category))
            .await?
            .into_iter()
            .map(|setting| {
                let value = match setting.kind {
                    SettingType::Json => setting.decoded(),
                    SettingType::Text | SettingType::Boolean | SettingType::Number => {
                        SettingValue::Text(setting.value)
                    }
                };
                (setting.key, value)
            })
            .collect())
    }
}

/// Decode settings into a key/value map.
#[must_use]
pub fn decode_all(settings: Vec<Setting>) -> SettingsMap {
    settings
        .into_iter()
        .map(|setting| {
            let value = setting.decoded();
            (setting.key, value)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(key: &str, value: &str, kind: &str) -> SettingRow {
        let now = Utc::now();
        SettingRow {
            key: key.to_owned(),
            value: value.to_owned(),
            kind: kind.to_owned(),
            category: "general".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_conversion_rejects_unknown_type() {
        let result = Setting::try_from(row("k", "v", "blob"));
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }

    #[test]
    fn test_decode_all_keeps_key_order() {
        let settings = vec![
            Setting::try_from(row("b_flag", "true", "boolean")).unwrap(),
            Setting::try_from(row("a_count", "12", "number")).unwrap(),
        ];
        let map = decode_all(settings);
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, ["a_count", "b_flag"]);
        assert_eq!(map["b_flag"], SettingValue::Bool(true));
    }
}
