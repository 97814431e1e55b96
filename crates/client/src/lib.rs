//! Typed HTTP client for the TechMorpho site API.
//!
//! Wraps every public and admin endpoint. GET requests are retried on 503
//! and on connection failures according to a [`RetryPolicy`]; POST, PUT
//! and DELETE are sent exactly once.
//!
//! ```rust,ignore
//! let mut client = ApiClient::new("http://localhost:3000")?;
//! let login = client.login("admin@techmorpho.in", "secret").await?;
//! client.set_token(login.token);
//! let stats = client.enquiry_stats().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod error;
mod retry;

pub use error::ClientError;
pub use retry::RetryPolicy;

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use url::Url;

use techmorpho_core::api::{ApiResponse, HealthStatus, LoginData, Pagination, SitemapData};
use techmorpho_core::{
    Enquiry, EnquiryFilter, EnquiryId, EnquiryReceipt, EnquiryStats, NewEnquiry, PageSeo, Service,
    ServiceId, ServiceInput, Setting, SettingType, SitePage, StatusUpdate,
};

/// Decoded settings as returned by the API.
pub type SettingsObject = Map<String, Value>;

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

/// Client for the TechMorpho site API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `base_url` is not a URL and
    /// `ClientError::Http` if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url)?;
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_owned(),
            token: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy for GET requests.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Send `token` as a bearer token on every request.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(SecretString::from(token.into()));
    }

    /// Stop sending a bearer token.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    // =========================================================================
    // Public endpoints
    // =========================================================================

    /// `GET /api/health`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server is unhealthy.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.get("/api/health", &[]).await?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Active services in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn services(&self) -> Result<Vec<Service>, ClientError> {
        let envelope = self.get_json::<Vec<Service>>("/api/services", &[]).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// One active service by slug.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown slug.
    pub async fn service(&self, slug: &str) -> Result<Service, ClientError> {
        let path = format!("/api/services/{}", urlencoding::encode(slug));
        data(self.get_json(&path, &[]).await?)
    }

    /// Public settings, optionally for one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn public_settings(
        &self,
        category: Option<&str>,
    ) -> Result<SettingsObject, ClientError> {
        let query: Vec<(&str, String)> = category
            .map(|c| vec![("category", c.to_owned())])
            .unwrap_or_default();
        let envelope = self.get_json::<SettingsObject>("/api/settings", &query).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// SEO record of a page; the empty record when the server sends none.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn page_seo(&self, path: &str) -> Result<PageSeo, ClientError> {
        let envelope = self
            .get_json::<PageSeo>("/api/settings/page-seo", &[("path", path.to_owned())])
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Submit the contact form.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with field errors for invalid input.
    pub async fn submit_contact(
        &self,
        enquiry: &NewEnquiry,
    ) -> Result<EnquiryReceipt, ClientError> {
        data(self.send_json(Method::POST, "/api/contact", Some(enquiry)).await?)
    }

    /// The sitemap document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sitemap_xml(&self) -> Result<String, ClientError> {
        let response = self.get("/sitemap.xml", &[]).await?;
        Ok(check_status(response).await?.text().await?)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a token. The token is not stored; pass it to
    /// [`ApiClient::set_token`].
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 for bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ClientError> {
        let body = json!({ "email": email, "password": password });
        data(
            self.send_json(Method::POST, "/api/admin/auth/login", Some(&body))
                .await?,
        )
    }

    // =========================================================================
    // Admin: services
    // =========================================================================

    /// Every service, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is not authorized.
    pub async fn admin_services(&self) -> Result<Vec<Service>, ClientError> {
        let envelope = self.get_json::<Vec<Service>>("/api/admin/services", &[]).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// A service by ID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown ID.
    pub async fn admin_service(&self, id: ServiceId) -> Result<Service, ClientError> {
        data(self.get_json(&format!("/api/admin/services/{id}"), &[]).await?)
    }

    /// Create a service.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 for invalid input or a
    /// duplicate slug.
    pub async fn create_service(&self, input: &ServiceInput) -> Result<Service, ClientError> {
        data(
            self.send_json(Method::POST, "/api/admin/services", Some(input))
                .await?,
        )
    }

    /// Update a service; omitted optional fields keep their values.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` for invalid input or an unknown ID.
    pub async fn update_service(
        &self,
        id: ServiceId,
        input: &ServiceInput,
    ) -> Result<Service, ClientError> {
        let path = format!("/api/admin/services/{id}");
        data(self.send_json(Method::PUT, &path, Some(input)).await?)
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown ID.
    pub async fn delete_service(&self, id: ServiceId) -> Result<(), ClientError> {
        let path = format!("/api/admin/services/{id}");
        self.send_json::<(), Value>(Method::DELETE, &path, None)
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Admin: enquiries
    // =========================================================================

    /// One page of enquiries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enquiries(
        &self,
        filter: &EnquiryFilter,
    ) -> Result<Paginated<Enquiry>, ClientError> {
        let mut query = Vec::new();
        if let Some(status) = filter.status {
            query.push(("status", status.to_string()));
        }
        if let Some(page) = filter.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }

        let envelope = self
            .get_json::<Vec<Enquiry>>("/api/admin/enquiries", &query)
            .await?;
        Ok(Paginated {
            items: envelope.data.unwrap_or_default(),
            pagination: envelope.pagination,
        })
    }

    /// An enquiry by ID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown ID.
    pub async fn enquiry(&self, id: EnquiryId) -> Result<Enquiry, ClientError> {
        data(self.get_json(&format!("/api/admin/enquiries/{id}"), &[]).await?)
    }

    /// Change an enquiry's status (and optionally its notes).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` for an unknown ID.
    pub async fn update_enquiry_status(
        &self,
        id: EnquiryId,
        update: &StatusUpdate,
    ) -> Result<Enquiry, ClientError> {
        let path = format!("/api/admin/enquiries/{id}/status");
        data(self.send_json(Method::PUT, &path, Some(update)).await?)
    }

    /// Delete an enquiry.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown ID.
    pub async fn delete_enquiry(&self, id: EnquiryId) -> Result<(), ClientError> {
        let path = format!("/api/admin/enquiries/{id}");
        self.send_json::<(), Value>(Method::DELETE, &path, None)
            .await
            .map(|_| ())
    }

    /// Enquiry counts per status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enquiry_stats(&self) -> Result<EnquiryStats, ClientError> {
        data(
            self.get_json("/api/admin/enquiries/stats/overview", &[])
                .await?,
        )
    }

    // =========================================================================
    // Admin: settings
    // =========================================================================

    /// Every setting, optionally for one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn settings(&self, category: Option<&str>) -> Result<SettingsObject, ClientError> {
        let query: Vec<(&str, String)> = category
            .map(|c| vec![("category", c.to_owned())])
            .unwrap_or_default();
        let envelope = self
            .get_json::<SettingsObject>("/api/admin/settings", &query)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Create or replace a setting.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 for an empty value.
    pub async fn save_setting(
        &self,
        key: &str,
        value: &Value,
        kind: SettingType,
        category: Option<&str>,
    ) -> Result<Setting, ClientError> {
        let mut body = json!({ "key": key, "value": value, "type": kind });
        if let (Some(category), Some(object)) = (category, body.as_object_mut()) {
            object.insert("category".to_owned(), Value::from(category));
        }
        data(
            self.send_json(Method::POST, "/api/admin/settings", Some(&body))
                .await?,
        )
    }

    /// Pages that can carry SEO metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn pages(&self) -> Result<Vec<SitePage>, ClientError> {
        let envelope = self
            .get_json::<Vec<SitePage>>("/api/admin/settings/pages", &[])
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Every stored page SEO record, keyed by storage key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn page_seo_records(&self) -> Result<SettingsObject, ClientError> {
        let envelope = self
            .get_json::<SettingsObject>("/api/admin/settings/page-seo", &[])
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Store the SEO record of a page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn save_page_seo(&self, path: &str, seo: &PageSeo) -> Result<PageSeo, ClientError> {
        let url = self.url("/api/admin/settings/page-seo");
        let request = self
            .authorize(self.http.put(url))
            .query(&[("path", path)])
            .json(seo);
        let response = request.send().await?;
        data(envelope(response).await?)
    }

    /// Regenerate and store the sitemap.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn generate_sitemap(&self) -> Result<SitemapData, ClientError> {
        data(
            self.get_json("/api/admin/settings/sitemap/generate", &[])
                .await?,
        )
    }

    // =========================================================================
    // Transport
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// GET with retries on 503 and connection failures.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ClientError> {
        let url = self.url(path);
        let mut attempt = 0;

        loop {
            let request = self.authorize(self.http.get(&url)).query(query);
            match request.send().await {
                Ok(response)
                    if RetryPolicy::is_retryable_status(response.status())
                        && self.retry.allows_retry(attempt) => {}
                Ok(response) => return Ok(response),
                Err(e) if RetryPolicy::is_retryable_error(&e) && self.retry.allows_retry(attempt) => {
                    tracing::debug!(error = %e, attempt, "Connection failed, retrying");
                }
                Err(e) => return Err(e.into()),
            }

            let delay = self.retry.delay_for(attempt);
            tracing::debug!(url = %url, attempt, delay = ?delay, "Retrying GET");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ClientError> {
        envelope(self.get(path, query).await?).await
    }

    /// Non-idempotent request, sent once.
    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, ClientError> {
        let mut request = self.authorize(self.http.request(method, self.url(path)));
        if let Some(body) = body {
            request = request.json(body);
        }
        envelope(request.send().await?).await
    }
}

/// Turn a non-2xx response into `ClientError::Api`, keeping the server's
/// message and field errors when the body is an envelope.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let bytes = response.bytes().await.unwrap_or_default();
    let (message, errors) = serde_json::from_slice::<ApiResponse<Value>>(&bytes).map_or_else(
        |_| ("Request failed".to_owned(), Vec::new()),
        |body| {
            (
                body.message.unwrap_or_else(|| "Request failed".to_owned()),
                body.errors,
            )
        },
    );

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        errors,
    })
}

async fn envelope<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>, ClientError> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
}

fn data<T>(envelope: ApiResponse<T>) -> Result<T, ClientError> {
    envelope.data.ok_or(ClientError::MissingData)
}
