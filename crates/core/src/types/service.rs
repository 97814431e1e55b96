//! Service catalogue records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ServiceId;

/// A content section on a service detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServiceSection {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Hero banner overrides for a service detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HeroBanner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_breadcrumb: Option<bool>,
}

/// One offered business service.
///
/// Services are listed by ascending `order`; rows sharing an `order` keep
/// their insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub icon: Option<String>,
    pub features: Vec<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub featured: bool,
    pub order: i32,
    pub active: bool,
    pub show_in_nav: bool,
    pub content: Option<String>,
    #[serde(default)]
    pub sections: Vec<ServiceSection>,
    pub hero_banner: Option<HeroBanner>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a service.
///
/// `title`, `slug` and `description` are always required and `features` is
/// required on create. For every other field `None` means "use the default"
/// on create and "keep the stored value" on update. An empty string clears
/// a nullable text field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_nav: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<ServiceSection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_banner: Option<HeroBanner>,
}

/// Collapse an optional text field: `Some("")` becomes `None`.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_owned)
}

impl Service {
    /// Apply an update payload, keeping stored values for omitted fields.
    pub fn apply(&mut self, input: &ServiceInput) {
        input.title.clone_into(&mut self.title);
        input.slug.clone_into(&mut self.slug);
        input.description.clone_into(&mut self.description);
        if let Some(features) = &input.features {
            features.clone_into(&mut self.features);
        }
        if input.icon.is_some() {
            self.icon = non_empty(input.icon.as_deref());
        }
        if input.tag.is_some() {
            self.tag = non_empty(input.tag.as_deref());
        }
        if input.category.is_some() {
            self.category = non_empty(input.category.as_deref());
        }
        if input.content.is_some() {
            self.content = non_empty(input.content.as_deref());
        }
        if let Some(featured) = input.featured {
            self.featured = featured;
        }
        if let Some(order) = input.order {
            self.order = order;
        }
        if let Some(active) = input.active {
            self.active = active;
        }
        if let Some(show_in_nav) = input.show_in_nav {
            self.show_in_nav = show_in_nav;
        }
        if let Some(sections) = &input.sections {
            sections.clone_into(&mut self.sections);
        }
        if let Some(banner) = &input.hero_banner {
            self.hero_banner = Some(banner.clone());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Service {
        let now = Utc::now();
        Service {
            id: ServiceId::new(1),
            title: "Web Development".to_owned(),
            slug: "web-development".to_owned(),
            description: "Sites".to_owned(),
            icon: Some("code".to_owned()),
            features: vec!["React".to_owned()],
            tag: None,
            category: Some("development".to_owned()),
            featured: true,
            order: 3,
            active: true,
            show_in_nav: true,
            content: None,
            sections: Vec::new(),
            hero_banner: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["showInNav"], true);
        assert_eq!(json["heroBanner"], json!(null));
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn test_apply_keeps_omitted_fields() {
        let mut service = sample();
        service.apply(&ServiceInput {
            title: "Web Apps".to_owned(),
            slug: "web-apps".to_owned(),
            description: "Apps".to_owned(),
            ..ServiceInput::default()
        });
        assert_eq!(service.title, "Web Apps");
        assert_eq!(service.icon.as_deref(), Some("code"));
        assert_eq!(service.features, vec!["React".to_owned()]);
        assert_eq!(service.order, 3);
        assert!(service.featured);
    }

    #[test]
    fn test_apply_empty_string_clears() {
        let mut service = sample();
        service.apply(&ServiceInput {
            title: service.title.clone(),
            slug: service.slug.clone(),
            description: service.description.clone(),
            icon: Some(String::new()),
            active: Some(false),
            ..ServiceInput::default()
        });
        assert_eq!(service.icon, None);
        assert!(!service.active);
    }

    #[test]
    fn test_input_skips_unset_fields() {
        let input = ServiceInput {
            title: "SEO".to_owned(),
            slug: "seo".to_owned(),
            description: "Rank".to_owned(),
            features: Some(vec![]),
            ..ServiceInput::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, json!({"title": "SEO", "slug": "seo", "description": "Rank", "features": []}));
    }
}
