//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;

use super::{ApiRequest, ApiResponse, RequestBody, Transport};
use crate::error::{GauthError, Result};

/// [`Transport`] over a shared `reqwest::Client`. Redirects are followed.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client whose requests fail with a transport error after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GauthError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let ApiRequest {
            method,
            url,
            options,
        } = request;
        let (headers, query, body) = options.into_parts();

        let mut builder = self.client.request(method.clone(), url.as_str()).headers(headers);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = match body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
            Some(RequestBody::Text(text)) => builder.body(text),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await?;

        tracing::debug!(%method, url = %url, status = status.as_u16(), "HTTP request completed");
        Ok(ApiResponse::new(status, final_url, headers, body))
    }
}
