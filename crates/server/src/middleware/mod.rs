//! HTTP middleware and extractors.
//!
//! The layer stack itself is assembled in [`crate::build_router`]:
//!
//! 1. Sentry layers (outermost, binary only)
//! 2. `TraceLayer` (`http_request` span with status and latency)
//! 3. CORS from `ALLOWED_ORIGINS`
//! 4. `X-Content-Type-Options: nosniff`
//! 5. Body size limit
//!
//! Admin routes additionally take the [`RequireAdmin`] extractor.

pub mod auth;

pub use auth::{AuthRejection, CurrentAdmin, RequireAdmin};
