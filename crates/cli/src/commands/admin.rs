//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! tm-cli admin create -e admin@techmorpho.in -n "Admin Name" -r super_admin -p 's3cret!'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ADMIN_PASSWORD` - Password used when `-p` is not given

use thiserror::Error;

use techmorpho_core::{AdminId, AdminRole, Email};
use techmorpho_server::db::AdminRepository;
use techmorpho_server::services::auth::{AuthError, hash_password};

use super::{CommandError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No password given.
    #[error("No password given: pass -p or set ADMIN_PASSWORD")]
    MissingPassword,

    /// User already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),

    /// Hashing or storage failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new admin user.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `role` - Admin's role (`super_admin`, `admin`, or `viewer`)
/// * `password` - Plain-text password; `ADMIN_PASSWORD` when `None`
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns an error for invalid input, an existing email, or a database failure.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: Option<String>,
) -> Result<AdminId, AdminError> {
    dotenvy::dotenv().ok();

    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(&email.to_lowercase())
        .map_err(|e| AdminError::InvalidEmail(format!("{email}: {e}")))?;
    let password = password
        .or_else(|| std::env::var("ADMIN_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .ok_or(AdminError::MissingPassword)?;

    // Hash before connecting so a short password fails fast
    let hash = hash_password(&password).await?;

    let pool = connect().await?;
    let admins = AdminRepository::new(&pool);

    tracing::info!("Creating admin user: {} ({})", email, role);

    if admins
        .get_by_email(&email)
        .await
        .map_err(AuthError::from)?
        .is_some()
    {
        return Err(AdminError::UserExists(email.into_inner()));
    }

    let admin = admins
        .create(&email, name.trim(), role, &hash)
        .await
        .map_err(AuthError::from)?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        admin.id,
        admin.email,
        admin.role
    );

    Ok(admin.id)
}
