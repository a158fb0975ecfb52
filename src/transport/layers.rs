//! Transport layers that apply retry or throttling around an inner transport.

use async_trait::async_trait;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::Result;
use crate::util::rate_limit::RateLimiter;
use crate::util::retry::RetryPolicy;

/// Re-sends a request according to a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T: Transport> Transport for Retrying<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.policy
            .execute(|| self.inner.send(request.clone()))
            .await
    }
}

/// Waits one [`RateLimiter`] interval before every request.
#[derive(Debug, Clone)]
pub struct Throttled<T> {
    inner: T,
    limiter: RateLimiter,
}

impl<T: Transport> Throttled<T> {
    pub fn new(inner: T, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<T: Transport> Transport for Throttled<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.limiter.acquire().await;
        self.inner.send(request).await
    }
}
