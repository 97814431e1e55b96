//! Contact enquiry repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use techmorpho_core::{
    Enquiry, EnquiryId, EnquiryStats, EnquiryStatus, NewEnquiry, StatusUpdate,
};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct EnquiryRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    service: String,
    message: String,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EnquiryRow> for Enquiry {
    type Error = RepositoryError;

    fn try_from(row: EnquiryRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<EnquiryStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("enquiry {}: {e}", row.id)))?;

        Ok(Self {
            id: EnquiryId::new(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            service: row.service,
            message: row.message,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ENQUIRY_COLUMNS: &str =
    "id, name, email, phone, service, message, status, notes, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for contact enquiries.
pub struct EnquiryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EnquiryRepository<'a> {
    /// Create a new enquiry repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a public submission with status `new`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, enquiry))]
    pub async fn create(&self, enquiry: &NewEnquiry) -> Result<Enquiry, RepositoryError> {
        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            "INSERT INTO contacts (name, email, phone, service, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ENQUIRY_COLUMNS}"
        ))
        .bind(&enquiry.name)
        .bind(&enquiry.email)
        .bind(&enquiry.phone)
        .bind(&enquiry.service)
        .bind(&enquiry.message)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// One page of enquiries, newest first, with the total matching count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<EnquiryStatus>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Enquiry>, i64), RepositoryError> {
        let status = status.map(|s| s.as_str());
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        let rows = sqlx::query_as::<_, EnquiryRow>(&format!(
            "SELECT {ENQUIRY_COLUMNS} FROM contacts
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contacts WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        let enquiries = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((enquiries, total))
    }

    /// Get an enquiry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: EnquiryId) -> Result<Option<Enquiry>, RepositoryError> {
        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            "SELECT {ENQUIRY_COLUMNS} FROM contacts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Change an enquiry's status. Notes are only replaced when non-empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the enquiry does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, update), fields(status = %update.status))]
    pub async fn update_status(
        &self,
        id: EnquiryId,
        update: &StatusUpdate,
    ) -> Result<Enquiry, RepositoryError> {
        let notes = update.notes.as_deref().filter(|n| !n.is_empty());

        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            "UPDATE contacts
             SET status = $2, notes = COALESCE($3, notes), updated_at = NOW()
             WHERE id = $1
             RETURNING {ENQUIRY_COLUMNS}"
        ))
        .bind(id)
        .bind(update.status.as_str())
        .bind(notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an enquiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the enquiry does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: EnquiryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Counts per status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row has an unknown status.
    pub async fn stats(&self) -> Result<EnquiryStats, RepositoryError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM contacts GROUP BY status")
                .fetch_all(self.pool)
                .await?;

        let mut stats = EnquiryStats::default();
        for (status, count) in rows {
            let status = status.parse::<EnquiryStatus>().map_err(RepositoryError::DataCorruption)?;
            stats.record(status, count);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion_rejects_unknown_status() {
        let now = Utc::now();
        let row = EnquiryRow {
            id: 1,
            name: "Jane".to_owned(),
            email: "jane@x.com".to_owned(),
            phone: None,
            service: "SEO".to_owned(),
            message: "hi".to_owned(),
            status: "spam".to_owned(),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            Enquiry::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
