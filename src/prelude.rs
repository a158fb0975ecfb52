//! Convenience re-exports for common use.

pub use crate::auth::{AuthorizeParams, Credential, CredentialStore, StoreOptions};
pub use crate::client::AuthorizingClient;
pub use crate::config::GauthConfig;
pub use crate::error::{ErrorKind, GauthError, Result};
pub use crate::transport::{ApiResponse, RequestOptions, Transport};
pub use crate::util::rate_limit::RateLimiter;
pub use crate::util::retry::{Retries, RetryPolicy};
