//! HTTP client for the Montage API
//!
//! Wraps `reqwest` with:
//! - Bearer credentials from an injected [`CredentialProvider`]
//! - Non-2xx responses mapped to [`ApiError::Status`] with a readable message
//! - An optional [`ErrorObserver`] notified of every failed exchange
//! - A per-request timeout

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::credentials::{Anonymous, CredentialProvider};
use super::observer::{ApiErrorEvent, ErrorObserver};
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("montage-client/", env!("CARGO_PKG_VERSION"));

/// Montage API client
///
/// Cheap to clone; clones share the connection pool, credentials and
/// observer.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    observer: Option<Arc<dyn ErrorObserver>>,
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    credentials: Arc<dyn CredentialProvider>,
    observer: Option<Arc<dyn ErrorObserver>>,
}

impl ApiClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            credentials: Arc::new(Anonymous),
            observer: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    pub fn error_observer(mut self, observer: impl ErrorObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: self.base_url.trim_end_matches('/').to_string(),
                credentials: self.credentials,
                observer: self.observer,
            }),
        })
    }
}

impl ApiClient {
    /// Create an unauthenticated client with default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        ApiClientBuilder::new(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// Builder preloaded with the base URL and timeout from configuration
    pub fn builder_from_config(config: &ApiConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config.base_url.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL for an API path (which starts with `/`)
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let request = self.inner.http.get(&url);
        self.fetch(Method::GET, url, request).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.inner.http.post(&url).json(body);
        self.fetch(Method::POST, url, request).await
    }

    /// POST with no request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let request = self.inner.http.post(&url);
        self.fetch(Method::POST, url, request).await
    }

    /// POST a multipart form; any 2xx counts as success and the body is dropped
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<()> {
        let url = self.url(path);
        let request = self.inner.http.post(&url).multipart(form);
        self.dispatch(Method::POST, url, request).await.map(drop)
    }

    /// POST a multipart form and decode the JSON response
    pub async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let url = self.url(path);
        let request = self.inner.http.post(&url).multipart(form);
        self.fetch(Method::POST, url, request).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.inner.http.patch(&url).json(body);
        self.fetch(Method::PATCH, url, request).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        let request = self.inner.http.delete(&url);
        self.dispatch(Method::DELETE, url, request).await.map(drop)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        request: RequestBuilder,
    ) -> Result<T> {
        let body = self.dispatch(method.clone(), url.clone(), request).await?;

        serde_json::from_slice(&body).map_err(|e| {
            let err = ApiError::Decode(e.to_string());
            self.notify(method, url, &err);
            err
        })
    }

    /// Send the request and return the raw body of a 2xx response
    async fn dispatch(
        &self,
        method: Method,
        url: String,
        request: RequestBuilder,
    ) -> Result<Vec<u8>> {
        let request = match self.inner.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let result = Self::send(request).await;

        match &result {
            Ok(body) => {
                tracing::trace!(method = %method, url = %url, bytes = body.len(), "API request ok");
            }
            Err(err) => self.notify(method, url, err),
        }

        result
    }

    async fn send(request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        Ok(body.to_vec())
    }

    fn notify(&self, method: Method, url: String, err: &ApiError) {
        tracing::debug!(method = %method, url = %url, error = %err, "API request failed");

        if let Some(observer) = &self.inner.observer {
            let message = match err {
                ApiError::Status { message, .. } => message.clone(),
                other => other.to_string(),
            };
            observer.on_error(&ApiErrorEvent {
                method,
                url,
                status: err.status(),
                message,
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
