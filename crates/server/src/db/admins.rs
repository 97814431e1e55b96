//! Admin account repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use techmorpho_core::api::AdminSummary;
use techmorpho_core::{AdminId, AdminRole, Email};

use super::RepositoryError;

/// Message returned when an email is already registered.
pub const DUPLICATE_ADMIN: &str = "Admin already exists";

/// An admin account, including its password hash.
#[derive(Clone)]
pub struct Admin {
    pub id: AdminId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub active: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for Admin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admin")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("active", &self.active)
            .field("password_hash", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Admin {
    /// Public view of the account.
    #[must_use]
    pub fn summary(&self) -> AdminSummary {
        AdminSummary {
            id: self.id,
            email: self.email.to_string(),
            name: self.name.clone(),
            role: Some(self.role),
        }
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: i32,
    email: String,
    name: String,
    role: String,
    active: bool,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = RepositoryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<AdminRole>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: AdminId::new(row.id),
            email,
            name: row.name,
            role,
            active: row.active,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

const ADMIN_COLUMNS: &str = "id, email, name, role, active, password_hash, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin accounts.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an admin by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an admin account from an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        role: AdminRole,
        password_hash: &str,
    ) -> Result<Admin, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "INSERT INTO admins (email, name, role, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(email)
        .bind(name)
        .bind(role.to_string())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_ADMIN))?;

        row.try_into()
    }

    /// Number of admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(self.pool)
            .await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        Admin {
            id: AdminId::new(1),
            email: Email::parse("admin@techmorpho.in").unwrap(),
            name: "Admin".to_owned(),
            role: AdminRole::SuperAdmin,
            active: true,
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_debug_redacts_hash() {
        let debug = format!("{:?}", admin());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("$2b$10$"));
    }

    #[test]
    fn test_summary() {
        let summary = admin().summary();
        assert_eq!(summary.email, "admin@techmorpho.in");
        assert_eq!(summary.role, Some(AdminRole::SuperAdmin));
    }
}
