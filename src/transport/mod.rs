//! HTTP transport seam: request/response values, the [`Transport`] trait and
//! composable layers around it.

pub mod http;
pub mod layers;

pub use http::HttpTransport;
pub use layers::{Retrying, Throttled};

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{GauthError, Result};

/// Anything that can execute an [`ApiRequest`].
///
/// Implementations report connection and timeout failures as
/// [`GauthError::Transport`] so retry layers can tell them apart from
/// HTTP-level outcomes, which are returned as a normal [`ApiResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request).await
    }
}

/// Request payload variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Text(String),
}

/// Per-request options: headers, query parameters and an optional body.
///
/// Options are plain values. [`with_bearer`](Self::with_bearer) returns a new
/// value that keeps every caller header and sets `Authorization`, replacing
/// any `Authorization` the caller supplied.
///
/// # Example
/// ```
/// use gauth::transport::RequestOptions;
///
/// let options = RequestOptions::new()
///     .try_header("x-goog-user-project", "demo")?
///     .query("maxResults", "10");
/// let authorized = options.with_bearer("token")?;
/// assert_eq!(authorized.headers()["authorization"], "Bearer token");
/// assert!(options.headers().get("authorization").is_none());
/// # Ok::<(), gauth::error::GauthError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a header from strings, rejecting invalid names or values.
    pub fn try_header(self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| GauthError::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| GauthError::InvalidRequest(format!("invalid value for header {name}: {e}")))?;
        Ok(self.header(name, value))
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.body = Some(RequestBody::Form(pairs));
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Copy of these options carrying `Authorization: Bearer <token>`.
    pub fn with_bearer(&self, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            GauthError::InvalidRequest("access token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        Ok(self.clone().header(AUTHORIZATION, value))
    }

    fn into_parts(self) -> (HeaderMap, Vec<(String, String)>, Option<RequestBody>) {
        (self.headers, self.query, self.body)
    }
}

/// A request target plus its options.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub options: RequestOptions,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            method,
            url: url.into(),
            options,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url, RequestOptions::new())
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url, RequestOptions::new())
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    url: String,
    headers: HeaderMap,
    body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, url: impl Into<String>, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            headers,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Final URL of the response, after redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| GauthError::Format(format!("invalid JSON body from {}: {e}", self.url)))
    }

    /// Return `self` when the status is a success, otherwise a
    /// [`GauthError::Status`] carrying the body.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_client_error() || self.status.is_server_error() {
            return Err(GauthError::status(self.status.as_u16(), &self.body));
        }
        Ok(self)
    }
}
