//! Configuration (layered: explicit values > env > defaults).

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{GauthError, Result};
use crate::transport::{HttpTransport, Throttled, Transport};
use crate::util::rate_limit::RateLimiter;
use crate::util::retry::{Retries, RetryPolicy};

pub const ENV_CREDENTIALS: &str = "GAUTH_CREDENTIALS";
pub const ENV_CLIENT_ID: &str = "GAUTH_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GAUTH_CLIENT_SECRET";
pub const ENV_MAX_RETRIES: &str = "GAUTH_MAX_RETRIES";
pub const ENV_RATE_LIMIT: &str = "GAUTH_RATE_LIMIT";
pub const ENV_TIMEOUT_SECS: &str = "GAUTH_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime settings for clients built by the CLI or by callers that prefer
/// environment-driven setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GauthConfig {
    /// Where the credential JSON lives.
    pub credentials_path: PathBuf,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Transport retries around each authorized request.
    pub max_retries: Retries,
    /// Optional throttle applied to every outgoing request.
    pub requests_per_second: Option<NonZeroU32>,
    pub timeout: Duration,
}

impl Default for GauthConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            client_id: None,
            client_secret: None,
            max_retries: Retries::Limited(crate::client::DEFAULT_TRANSPORT_RETRIES),
            requests_per_second: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GauthConfig {
    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(ENV_CREDENTIALS)) {
            config.credentials_path = PathBuf::from(path);
        }
        config.client_id = non_empty(lookup(ENV_CLIENT_ID));
        config.client_secret = non_empty(lookup(ENV_CLIENT_SECRET));

        if let Some(raw) = non_empty(lookup(ENV_MAX_RETRIES)) {
            let count: i64 = raw.trim().parse().map_err(|_| {
                GauthError::Configuration(format!("{ENV_MAX_RETRIES} must be an integer, got {raw:?}"))
            })?;
            config.max_retries = Retries::from_count(count);
        }
        if let Some(raw) = non_empty(lookup(ENV_RATE_LIMIT)) {
            let rate: u32 = raw.trim().parse().map_err(|_| {
                GauthError::Configuration(format!("{ENV_RATE_LIMIT} must be a positive integer, got {raw:?}"))
            })?;
            config.requests_per_second = Some(NonZeroU32::new(rate).ok_or_else(|| {
                GauthError::Configuration(format!("{ENV_RATE_LIMIT} must be greater than zero"))
            })?);
        }
        if let Some(raw) = non_empty(lookup(ENV_TIMEOUT_SECS)) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                GauthError::Configuration(format!("{ENV_TIMEOUT_SECS} must be a number of seconds, got {raw:?}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// HTTP transport with the configured timeout, throttled when a rate is set.
    pub fn transport(&self) -> Result<Arc<dyn Transport>> {
        let http = HttpTransport::with_timeout(self.timeout)?;
        Ok(match self.requests_per_second {
            Some(rate) => Arc::new(Throttled::new(http, RateLimiter::per_second(rate))),
            None => Arc::new(http),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::transient(self.max_retries)
    }
}

/// Default credential file path (~/.gauth/credentials.json).
pub fn default_credentials_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".gauth"))
        .unwrap_or_else(|| PathBuf::from(".gauth"))
        .join("credentials.json")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
