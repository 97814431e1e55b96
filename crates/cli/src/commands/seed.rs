//! Seed the database with the default admin and site settings.
//!
//! Nothing existing is overwritten: the admin is only created when its
//! email is unknown, and settings are inserted only for missing keys.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ADMIN_EMAIL` - Default admin email (default `admin@techmorpho.com`)
//! - `ADMIN_NAME` - Default admin name (default `Admin User`)
//! - `ADMIN_PASSWORD` - Required when the default admin does not exist yet

use tracing::{info, warn};

use techmorpho_core::{AdminRole, DEFAULT_CATEGORY, Email, SettingValue};
use techmorpho_server::db::{AdminRepository, SettingsRepository};
use techmorpho_server::services::auth::hash_password;

use super::connect;

const DEFAULT_ADMIN_EMAIL: &str = "admin@techmorpho.com";
const DEFAULT_ADMIN_NAME: &str = "Admin User";

/// Settings inserted into the `general` category when absent.
fn default_settings() -> Vec<(&'static str, SettingValue)> {
    vec![
        ("site_name", SettingValue::Text("TechMorpho IT Solutions".to_owned())),
        (
            "site_tagline",
            SettingValue::Text("Web, mobile and digital marketing solutions".to_owned()),
        ),
        ("maintenance_mode", SettingValue::Bool(false)),
        ("services_per_page", SettingValue::Number(12.0)),
    ]
}

/// Run the seed.
///
/// # Errors
///
/// Returns an error if the database is unreachable, or if the default admin
/// must be created and `ADMIN_PASSWORD` is missing or too short.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_owned());
    let email = Email::parse(&email.to_lowercase())?;
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| DEFAULT_ADMIN_NAME.to_owned());

    let admins = AdminRepository::new(&pool);
    if admins.get_by_email(&email).await?.is_some() {
        info!(email = %email, "Admin user already exists");
    } else {
        let password = std::env::var("ADMIN_PASSWORD")
            .map_err(|_| "ADMIN_PASSWORD must be set to create the default admin")?;
        let hash = hash_password(&password).await?;
        let admin = admins.create(&email, &name, AdminRole::Admin, &hash).await?;
        info!(admin_id = %admin.id, email = %admin.email, "Created default admin user");
        warn!("Please change the password after first login!");
    }

    let settings = SettingsRepository::new(&pool);
    let mut inserted = 0;
    for (key, value) in default_settings() {
        if settings.insert_if_absent(key, &value, DEFAULT_CATEGORY).await? {
            inserted += 1;
        }
    }
    info!(inserted, "Default settings seeded");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_have_unique_keys() {
        let settings = default_settings();
        let mut keys: Vec<&str> = settings.iter().map(|(key, _)| *key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), settings.len());
    }
}
