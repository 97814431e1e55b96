//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, inactive account, or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password shorter than the minimum length.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// Email already registered.
    #[error("Admin already exists")]
    AdminExists,

    /// Self-service registration is switched off.
    #[error("Admin registration is disabled")]
    RegistrationDisabled,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] techmorpho_core::EmailError),

    /// Token could not be issued or verified.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// The blocking hashing task did not complete.
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
