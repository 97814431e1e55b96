//! TechMorpho Core - Shared types library.
//!
//! This crate provides common types used across all TechMorpho components:
//! - `server` - REST API for the public site and the admin panel
//! - `client` - HTTP data layer used by site frontends and tooling
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, statuses, settings, page SEO, services and enquiries
//! - [`api`] - JSON envelopes shared by the server and the client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod types;

pub use types::*;
