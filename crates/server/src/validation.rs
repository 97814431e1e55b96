//! Request schemas and the extractors that validate them.
//!
//! Handlers never see raw bodies: [`ValidatedJson`] deserializes the loose
//! wire shape, runs [`Validate`], and hands over the typed value or rejects
//! with 400 and a field error list.

use std::str::FromStr;

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::request::Parts;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use utoipa::ToSchema;

use techmorpho_core::api::FieldError;
use techmorpho_core::{
    DEFAULT_CATEGORY, Email, EnquiryStatus, HeroBanner, NewEnquiry, PageSeo, ServiceInput,
    ServiceSection, SettingType, StatusUpdate, encode_input,
};

use crate::error::AppError;
use crate::services::auth::MIN_PASSWORD_LENGTH;

/// Default page size of the enquiry listing.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A request schema that converts into a validated value.
pub trait Validate {
    type Output;

    /// Check every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per invalid field.
    fn validate(self) -> Result<Self::Output, Vec<FieldError>>;
}

/// JSON body extractor that runs [`Validate`] before the handler.
pub struct ValidatedJson<T: Validate>(pub T::Output);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: Validate + DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Rejected request body");
            AppError::field("body", "Invalid request body")
        })?;

        body.validate().map(Self).map_err(AppError::Validation)
    }
}

/// Numeric path parameter; anything unparsable is a 400.
pub struct PathId<T>(pub T);

impl<S, T> FromRequestParts<S> for PathId<T>
where
    T: FromStr + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid id".to_owned()))?;

        raw.parse()
            .map(Self)
            .map_err(|_| AppError::BadRequest("Invalid id".to_owned()))
    }
}

/// Collects field errors while a schema is being checked.
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Trimmed non-empty text, or an error on `field`.
    fn required(&mut self, field: &str, value: Option<String>, message: &str) -> String {
        match value.map(|v| v.trim().to_owned()) {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.fail(field, message);
                String::new()
            }
        }
    }

    /// A valid email, kept as submitted apart from surrounding whitespace.
    fn email(&mut self, value: Option<&str>) -> Option<Email> {
        let parsed = value.and_then(|raw| Email::parse(raw).ok());
        if parsed.is_none() {
            self.fail("email", "Valid email is required");
        }
        parsed
    }

    /// A valid email folded to lowercase, the form admin accounts are keyed by.
    fn account_email(&mut self, value: Option<&str>) -> Option<Email> {
        self.email(value.map(str::to_lowercase).as_deref())
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self.errors)
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// Validated login credentials.
#[derive(Debug)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

impl Validate for LoginRequest {
    type Output = Credentials;

    fn validate(self) -> Result<Credentials, Vec<FieldError>> {
        let mut check = Checker::default();
        let email = check.account_email(self.email.as_deref());
        let password = self.password.unwrap_or_default();
        if password.is_empty() {
            check.fail("password", "Password is required");
        }

        match email {
            Some(email) => check.finish(|| Credentials { email, password }),
            None => Err(check.errors),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

/// Validated self-registration.
#[derive(Debug)]
pub struct Registration {
    pub email: Email,
    pub password: String,
    pub name: String,
}

impl Validate for RegisterRequest {
    type Output = Registration;

    fn validate(self) -> Result<Registration, Vec<FieldError>> {
        let mut check = Checker::default();
        let email = check.account_email(self.email.as_deref());
        let password = self.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            check.fail(
                "password",
                &format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        let name = check.required("name", self.name, "Name is required");

        match email {
            Some(email) => check.finish(|| Registration {
                email,
                password,
                name,
            }),
            None => Err(check.errors),
        }
    }
}

// =============================================================================
// Contact
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactRequest {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    service: Option<String>,
    message: Option<String>,
}

impl Validate for ContactRequest {
    type Output = NewEnquiry;

    fn validate(self) -> Result<NewEnquiry, Vec<FieldError>> {
        let mut check = Checker::default();
        let name = check.required("name", self.name, "Name is required");
        let email = check.email(self.email.as_deref());
        let service = check.required("service", self.service, "Service selection is required");
        let message = check.required("message", self.message, "Message is required");
        let phone = self
            .phone
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty());

        match email {
            Some(email) => check.finish(|| NewEnquiry {
                name,
                email: email.into_inner(),
                phone,
                service,
                message,
            }),
            None => Err(check.errors),
        }
    }
}

// =============================================================================
// Services
// =============================================================================

/// Wire shape shared by service create and update.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    title: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    features: Option<Value>,
    icon: Option<String>,
    tag: Option<String>,
    category: Option<String>,
    featured: Option<bool>,
    order: Option<i32>,
    active: Option<bool>,
    show_in_nav: Option<bool>,
    content: Option<String>,
    sections: Option<Vec<ServiceSection>>,
    hero_banner: Option<HeroBanner>,
}

impl ServiceRequest {
    fn into_input(self, features_required: bool) -> Result<ServiceInput, Vec<FieldError>> {
        let mut check = Checker::default();
        let title = check.required("title", self.title, "Title is required");
        let slug = check.required("slug", self.slug, "Slug is required");
        let description = check.required("description", self.description, "Description is required");

        let features = match self.features.filter(|value| !value.is_null()) {
            None if !features_required => None,
            value => {
                let parsed = value.and_then(|v| serde_json::from_value::<Vec<String>>(v).ok());
                if parsed.is_none() {
                    check.fail("features", "Features must be an array");
                }
                parsed
            }
        };

        check.finish(|| ServiceInput {
            title,
            slug,
            description,
            features,
            icon: self.icon,
            tag: self.tag,
            category: self.category,
            featured: self.featured,
            order: self.order,
            active: self.active,
            show_in_nav: self.show_in_nav,
            content: self.content,
            sections: self.sections,
            hero_banner: self.hero_banner,
        })
    }
}

/// Service creation body; `features` must be an array.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct CreateServiceRequest(ServiceRequest);

impl Validate for CreateServiceRequest {
    type Output = ServiceInput;

    fn validate(self) -> Result<ServiceInput, Vec<FieldError>> {
        self.0.into_input(true)
    }
}

/// Service update body; omitted optional fields keep their stored values.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct UpdateServiceRequest(ServiceRequest);

impl Validate for UpdateServiceRequest {
    type Output = ServiceInput;

    fn validate(self) -> Result<ServiceInput, Vec<FieldError>> {
        self.0.into_input(false)
    }
}

// =============================================================================
// Enquiries
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    status: Option<String>,
    notes: Option<String>,
}

impl Validate for StatusRequest {
    type Output = StatusUpdate;

    fn validate(self) -> Result<StatusUpdate, Vec<FieldError>> {
        let status = self
            .status
            .as_deref()
            .and_then(|s| s.parse::<EnquiryStatus>().ok())
            .ok_or_else(|| vec![FieldError::new("status", "Invalid status")])?;

        Ok(StatusUpdate {
            status,
            notes: self.notes,
        })
    }
}

/// Query string of the enquiry listing.
#[derive(Debug, Default, Deserialize)]
pub struct EnquiryListQuery {
    status: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

/// Parsed enquiry listing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnquiryPage {
    pub status: Option<EnquiryStatus>,
    pub page: u32,
    pub limit: u32,
}

impl EnquiryListQuery {
    /// Resolve defaults: unparsable `page`/`limit` fall back to 1 and 50,
    /// `limit` is clamped to 100.
    ///
    /// # Errors
    ///
    /// Returns a field error for an unknown `status`.
    pub fn resolve(self) -> Result<EnquiryPage, AppError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<EnquiryStatus>()
                    .map_err(|_| AppError::field("status", "Invalid status"))?,
            ),
        };
        let page = self
            .page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let limit = self
            .limit
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);

        Ok(EnquiryPage {
            status,
            page,
            limit,
        })
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct SettingRequest {
    key: Option<String>,
    #[schema(value_type = Option<Object>)]
    value: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    category: Option<String>,
}

/// A setting write, already in storage form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingWrite {
    pub key: String,
    pub raw: String,
    pub kind: SettingType,
    pub category: String,
}

impl Validate for SettingRequest {
    type Output = SettingWrite;

    fn validate(self) -> Result<SettingWrite, Vec<FieldError>> {
        let mut check = Checker::default();
        let key = check.required("key", self.key, "Key is required");

        let value = match self.value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(value),
        };
        if value.is_none() {
            check.fail("value", "Value is required");
        }

        let kind = self.kind.as_deref().and_then(|k| k.parse::<SettingType>().ok());
        if kind.is_none() {
            check.fail("type", "Invalid type");
        }

        let category = self
            .category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());

        match (value, kind) {
            (Some(value), Some(kind)) => check.finish(|| SettingWrite {
                key,
                raw: encode_input(kind, &value),
                kind,
                category,
            }),
            _ => Err(check.errors),
        }
    }
}

impl Validate for PageSeo {
    type Output = Self;

    fn validate(self) -> Result<Self, Vec<FieldError>> {
        Ok(self)
    }
}

/// `?path=` of the page-SEO endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

impl PathQuery {
    /// The requested path.
    ///
    /// # Errors
    ///
    /// Returns 400 when `path` is absent or empty.
    pub fn required(self) -> Result<String, AppError> {
        self.path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::BadRequest("Path parameter is required".to_owned()))
    }
}

/// `?category=` of the settings listings.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse<T: DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_contact_valid() {
        let request: ContactRequest = parse(json!({
            "name": " Jane ",
            "email": "Jane@X.com",
            "service": "SEO",
            "message": "hi"
        }));
        let enquiry = request.validate().unwrap();
        assert_eq!(enquiry.name, "Jane");
        assert_eq!(enquiry.email, "Jane@X.com");
        assert_eq!(enquiry.phone, None);
    }

    #[test]
    fn test_contact_keeps_email_case() {
        let request: ContactRequest = parse(json!({
            "name": "Ravi",
            "email": "  Ravi@Example.com ",
            "service": "web-development",
            "message": "Need a quote"
        }));
        assert_eq!(request.validate().unwrap().email, "Ravi@Example.com");
    }

    #[test]
    fn test_account_emails_are_lowercased() {
        let request: LoginRequest =
            parse(json!({"email": "Owner@TechMorpho.in", "password": "secret"}));
        assert_eq!(request.validate().unwrap().email.as_str(), "owner@techmorpho.in");

        let request: RegisterRequest =
            parse(json!({"email": "New@TechMorpho.in", "password": "longenough", "name": "New"}));
        assert_eq!(request.validate().unwrap().email.as_str(), "new@techmorpho.in");
    }

    #[test]
    fn test_contact_missing_email() {
        let request: ContactRequest =
            parse(json!({"name": "Jane", "service": "SEO", "message": "hi"}));
        let errors = request.validate().unwrap_err();
        assert_eq!(fields(&errors), ["email"]);
        assert_eq!(errors[0].message, "Valid email is required");
    }

    #[test]
    fn test_contact_reports_every_field() {
        let request: ContactRequest = parse(json!({"email": "nope"}));
        let errors = request.validate().unwrap_err();
        assert_eq!(fields(&errors), ["name", "email", "service", "message"]);
    }

    #[test]
    fn test_login_requires_password() {
        let request: LoginRequest = parse(json!({"email": "admin@techmorpho.in"}));
        let errors = request.validate().unwrap_err();
        assert_eq!(errors[0].message, "Password is required");
    }

    #[test]
    fn test_register_short_password_and_missing_name() {
        let request: RegisterRequest =
            parse(json!({"email": "a@b.co", "password": "12345", "name": "  "}));
        let errors = request.validate().unwrap_err();
        assert_eq!(fields(&errors), ["password", "name"]);
    }

    #[test]
    fn test_create_service_requires_features_array() {
        let request: CreateServiceRequest = parse(json!({
            "title": "SEO", "slug": "seo", "description": "Rank", "features": "fast"
        }));
        let errors = request.validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("features", "Features must be an array")]);

        let request: CreateServiceRequest =
            parse(json!({"title": "SEO", "slug": "seo", "description": "Rank"}));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_service_allows_missing_features() {
        let request: UpdateServiceRequest = parse(json!({
            "title": "SEO", "slug": "seo", "description": "Rank", "order": 3, "showInNav": false
        }));
        let input = request.validate().unwrap();
        assert_eq!(input.features, None);
        assert_eq!(input.order, Some(3));
        assert_eq!(input.show_in_nav, Some(false));
    }

    #[test]
    fn test_status_request() {
        let request: StatusRequest = parse(json!({"status": "archived"}));
        let update = request.validate().unwrap();
        assert_eq!(update.status, EnquiryStatus::Archived);
        assert_eq!(update.notes, None);

        let request: StatusRequest = parse(json!({"status": "spam"}));
        assert_eq!(request.validate().unwrap_err()[0].message, "Invalid status");
    }

    #[test]
    fn test_enquiry_query_defaults_and_clamp() {
        let page = EnquiryListQuery::default().resolve().unwrap();
        assert_eq!((page.page, page.limit, page.status), (1, 50, None));

        let page = EnquiryListQuery {
            status: Some("new".to_owned()),
            page: Some("abc".to_owned()),
            limit: Some("500".to_owned()),
        }
        .resolve()
        .unwrap();
        assert_eq!((page.page, page.limit), (1, 100));
        assert_eq!(page.status, Some(EnquiryStatus::New));

        let bad = EnquiryListQuery {
            status: Some("spam".to_owned()),
            ..Default::default()
        };
        assert!(matches!(bad.resolve(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_setting_request_coerces_value() {
        let request: SettingRequest =
            parse(json!({"key": "show_banner", "value": 1, "type": "boolean"}));
        let write = request.validate().unwrap();
        assert_eq!(write.raw, "true");
        assert_eq!(write.category, "general");

        let request: SettingRequest =
            parse(json!({"key": "menu", "value": {"a": 1}, "type": "json", "category": "branding"}));
        let write = request.validate().unwrap();
        assert_eq!(write.raw, r#"{"a":1}"#);
        assert_eq!(write.category, "branding");
    }

    #[test]
    fn test_setting_request_errors() {
        let request: SettingRequest = parse(json!({"key": "", "value": "", "type": "blob"}));
        let errors = request.validate().unwrap_err();
        assert_eq!(fields(&errors), ["key", "value", "type"]);
        assert_eq!(errors[2].message, "Invalid type");
    }

    #[test]
    fn test_false_is_a_value() {
        let request: SettingRequest =
            parse(json!({"key": "maintenance", "value": false, "type": "boolean"}));
        assert_eq!(request.validate().unwrap().raw, "false");
    }

    #[test]
    fn test_path_query_required() {
        assert!(PathQuery::default().required().is_err());
        let path = PathQuery {
            path: Some("/about".to_owned()),
        };
        assert_eq!(path.required().unwrap(), "/about");
    }
}
