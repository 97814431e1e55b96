//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password login, bcrypt hashing and admin tokens
//! - `sitemap` - Sitemap rendering

pub mod auth;
pub mod sitemap;

pub use auth::{AuthError, AuthService, Claims, TokenService};
