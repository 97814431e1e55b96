//! Admin authentication service.
//!
//! Password login against bcrypt hashes, issuing HS256 bearer tokens. There
//! is no refresh flow: an expired token always means a fresh login.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenService};

use sqlx::PgPool;
use tracing::instrument;

use techmorpho_core::api::LoginData;
use techmorpho_core::{AdminRole, Email};

use crate::db::{Admin, AdminRepository, RepositoryError};

/// bcrypt work factor; hashes stay interchangeable with `$2a$`/`$2b$` hashes
/// produced by other bcrypt implementations at the same cost.
pub const BCRYPT_COST: u32 = 10;

/// Minimum admin password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a password on the blocking pool.
///
/// # Errors
///
/// Returns `AuthError::PasswordTooShort` for short passwords and
/// `AuthError::Hashing` if bcrypt fails.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    let password = password.to_owned();
    Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST)).await??)
}

/// Check a password against a stored hash on the blocking pool.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if the stored hash is malformed.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}

/// Admin authentication service.
pub struct AuthService<'a> {
    admins: AdminRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            admins: AdminRepository::new(pool),
            tokens,
        }
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email, an
    /// inactive account, or a wrong password.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<LoginData, AuthError> {
        let admin = self
            .admins
            .get_by_email(email)
            .await?
            .filter(|admin| admin.active)
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &admin.password_hash).await? {
            tracing::info!(admin_id = %admin.id, "Rejected login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&admin)?;
        tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin logged in");

        Ok(LoginData {
            token,
            user: admin.summary(),
        })
    }

    /// Create an admin account with the given role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AdminExists` if the email is taken and
    /// `AuthError::PasswordTooShort` for short passwords.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        email: &Email,
        password: &str,
        name: &str,
        role: AdminRole,
    ) -> Result<Admin, AuthError> {
        if self.admins.get_by_email(email).await?.is_some() {
            return Err(AuthError::AdminExists);
        }

        let hash = hash_password(password).await?;
        let admin = self
            .admins
            .create(email, name, role, &hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AdminExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin account created");
        Ok(admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("s3cure-pass").await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3cure-pass", &hash).await.unwrap());
        assert!(!verify_password("wrong-pass", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_rejects_short_password() {
        assert!(matches!(
            hash_password("12345").await,
            Err(AuthError::PasswordTooShort { min: 6 })
        ));
    }

    #[tokio::test]
    async fn test_verify_accepts_2a_prefix() {
        let hash = hash_password("abcdef").await.unwrap();
        let legacy = format!("$2a{}", &hash[3..]);
        assert!(verify_password("abcdef", &legacy).await.unwrap());
    }
}
