//! Core types for TechMorpho.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod enquiry;
pub mod id;
pub mod seo;
pub mod service;
pub mod setting;
pub mod status;

pub use email::{Email, EmailError};
pub use enquiry::{Enquiry, EnquiryFilter, EnquiryReceipt, EnquiryStats, NewEnquiry, StatusUpdate};
pub use id::*;
pub use seo::{
    PAGE_SEO_CATEGORY, PAGE_SEO_PREFIX, PageKind, PageSeo, STATIC_PAGES, SitePage, page_seo_key,
    path_from_page_seo_key,
};
pub use service::{HeroBanner, Service, ServiceInput, ServiceSection, non_empty};
pub use setting::{
    DEFAULT_CATEGORY, PUBLIC_CATEGORIES, Setting, SettingType, SettingValue, SettingsMap,
    encode_input, is_public_category, is_truthy, parse_float,
};
pub use status::*;
