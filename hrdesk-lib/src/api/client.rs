//! Main ApiClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use url::Url;

use super::ResourceClient;
use crate::error::ApiError;

/// Client for the HR REST backend.
///
/// Cheap to clone (uses `Arc` internally) and safe to share across tasks.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    base_url: Url,
    token: Option<String>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> ApiClientBuilder<Missing> {
        ApiClientBuilder::new()
    }

    /// Returns the base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns a client for one collection, e.g. `"roles"`.
    pub fn resource(&self, path: impl Into<String>) -> ResourceClient {
        ResourceClient::new(self.clone(), path)
    }

    /// Resolves a path relative to the base URL.
    pub(crate) fn join(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http_client
    }

    /// Sends a request with auth and timeout applied.
    ///
    /// Non-success responses become [`ApiError::Http`] carrying the body.
    pub(crate) async fn send(&self, mut request: RequestBuilder) -> Result<Response, ApiError> {
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::http(status, body))
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "***"))
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

/// Parses a base URL and makes sure it ends in `/` so relative joins append.
fn normalize_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`ApiClient`].
///
/// The base URL is required and enforced at compile time; `build` only
/// exists once it is set.
pub struct ApiClientBuilder<U> {
    url: U,
    token: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ApiClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token: None,
            timeout: None,
            connect_timeout: None,
        }
    }

    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> ApiClientBuilder<Set<String>> {
        ApiClientBuilder {
            url: Set(url.into()),
            token: self.token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
        }
    }
}

impl Default for ApiClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> ApiClientBuilder<U> {
    /// Sets the bearer token. Blank tokens are ignored.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

impl ApiClientBuilder<Set<String>> {
    /// Builds the [`ApiClient`].
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url = normalize_base_url(&self.url.0)?;
        let mut builder = Client::builder();
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                base_url,
                token: self.token,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = normalize_base_url("https://hr.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://hr.example.com/api/");

        let url = normalize_base_url("https://hr.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://hr.example.com/api/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            normalize_base_url("mailto:hr@example.com"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let client = ApiClient::builder()
            .url("http://localhost:8000")
            .token("  ")
            .build()
            .unwrap();
        assert!(client.inner.token.is_none());
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }
}
