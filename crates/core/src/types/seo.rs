//! Per-page SEO metadata and the site page catalogue.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::setting::SettingType;

/// Prefix of the setting key holding a page's SEO record.
pub const PAGE_SEO_PREFIX: &str = "page_seo_";

/// Category under which page SEO records are stored.
pub const PAGE_SEO_CATEGORY: &str = "page_seo";

/// Storage key for the SEO record of `path`.
///
/// The path is used verbatim: `/services` and `/services/` are different
/// keys.
#[must_use]
pub fn page_seo_key(path: &str) -> String {
    format!("{PAGE_SEO_PREFIX}{path}")
}

/// Recover the page path from a storage key produced by [`page_seo_key`].
#[must_use]
pub fn path_from_page_seo_key(key: &str) -> Option<&str> {
    key.strip_prefix(PAGE_SEO_PREFIX)
}

/// Meta and Open Graph tags for one page.
///
/// The default value (every field empty) is what callers receive for pages
/// that have never been configured.
///
/// Each field is read leniently: `null`, a number or any other non-string
/// value becomes the empty string instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct PageSeo {
    #[serde(deserialize_with = "lenient_string")]
    pub meta_title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub meta_description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub meta_keywords: String,
    #[serde(deserialize_with = "lenient_string")]
    pub og_title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub og_description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub og_image: String,
    #[serde(deserialize_with = "lenient_string")]
    pub canonical_url: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

impl PageSeo {
    /// Decode a stored record.
    ///
    /// Returns `None` when the setting is not JSON-typed or the JSON does not
    /// describe a record. Missing fields default to empty strings.
    #[must_use]
    pub fn from_stored(kind: SettingType, raw: &str) -> Option<Self> {
        match kind {
            SettingType::Json => serde_json::from_str(raw).ok(),
            SettingType::Text | SettingType::Boolean | SettingType::Number => None,
        }
    }

    /// Serialized storage form.
    #[must_use]
    pub fn to_stored(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_owned())
    }
}

/// Whether a page is fixed or backed by a service row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Static,
    Dynamic,
}

/// A page that can carry SEO metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SitePage {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: PageKind,
}

/// The fixed pages of the site, as `(name, path)`.
pub const STATIC_PAGES: [(&str, &str); 5] = [
    ("Home", "/"),
    ("Services", "/services"),
    ("About", "/about"),
    ("Contact", "/contact"),
    ("Portfolio", "/portfolio"),
];

impl SitePage {
    /// The static pages in navigation order.
    #[must_use]
    pub fn static_pages() -> Vec<Self> {
        STATIC_PAGES
            .iter()
            .map(|(name, path)| Self {
                name: (*name).to_owned(),
                path: (*path).to_owned(),
                kind: PageKind::Static,
            })
            .collect()
    }

    /// The detail page of a service.
    #[must_use]
    pub fn for_service(title: &str, slug: &str) -> Self {
        Self {
            name: title.to_owned(),
            path: format!("/services/{slug}"),
            kind: PageKind::Dynamic,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_key_uses_path_verbatim() {
        assert_eq!(page_seo_key("/about"), "page_seo_/about");
        assert_eq!(page_seo_key("/about/"), "page_seo_/about/");
        assert_eq!(path_from_page_seo_key("page_seo_/about"), Some("/about"));
        assert_eq!(path_from_page_seo_key("sitemap_xml"), None);
    }

    #[test]
    fn test_default_is_all_empty_strings() {
        let json = serde_json::to_value(PageSeo::default()).unwrap();
        assert_eq!(
            json,
            json!({
                "metaTitle": "",
                "metaDescription": "",
                "metaKeywords": "",
                "ogTitle": "",
                "ogDescription": "",
                "ogImage": "",
                "canonicalUrl": ""
            })
        );
    }

    #[test]
    fn test_from_stored_fills_missing_fields() {
        let seo = PageSeo::from_stored(SettingType::Json, r#"{"metaTitle":"About us"}"#).unwrap();
        assert_eq!(seo.meta_title, "About us");
        assert_eq!(seo.og_image, "");
    }

    #[test]
    fn test_from_stored_treats_null_fields_as_empty() {
        let seo = PageSeo::from_stored(
            SettingType::Json,
            r#"{"metaTitle":"About us","metaDescription":"Who we are","ogImage":null}"#,
        )
        .unwrap();
        assert_eq!(seo.meta_title, "About us");
        assert_eq!(seo.meta_description, "Who we are");
        assert_eq!(seo.og_image, "");
    }

    #[test]
    fn test_from_stored_treats_non_string_fields_as_empty() {
        let seo = PageSeo::from_stored(
            SettingType::Json,
            r#"{"metaTitle":"Home","ogTitle":42,"canonicalUrl":["x"]}"#,
        )
        .unwrap();
        assert_eq!(seo.meta_title, "Home");
        assert_eq!(seo.og_title, "");
        assert_eq!(seo.canonical_url, "");
    }

    #[test]
    fn test_from_stored_rejects_non_records() {
        assert!(PageSeo::from_stored(SettingType::Json, "not json").is_none());
        assert!(PageSeo::from_stored(SettingType::Json, "[1,2]").is_none());
        assert!(PageSeo::from_stored(SettingType::Text, "{}").is_none());
    }

    #[test]
    fn test_to_stored_round_trips() {
        let seo = PageSeo {
            meta_title: "Home".to_owned(),
            canonical_url: "https://techmorpho.in/".to_owned(),
            ..PageSeo::default()
        };
        assert_eq!(PageSeo::from_stored(SettingType::Json, &seo.to_stored()), Some(seo));
    }

    #[test]
    fn test_site_pages() {
        let pages = SitePage::static_pages();
        assert_eq!(pages.len(), 5);
        assert_eq!(pages[0].path, "/");
        let page = SitePage::for_service("Web Development", "web-development");
        assert_eq!(page.path, "/services/web-development");
        assert_eq!(serde_json::to_value(&page).unwrap()["type"], "dynamic");
    }
}
