//! Retry wrapper for operations that fail with selected error kinds.

use std::future::Future;

use crate::error::{ErrorKind, GauthError};

/// How many additional attempts a [`RetryPolicy`] may make after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retries {
    Limited(u32),
    Unlimited,
}

impl Retries {
    /// Interpret a signed count; any negative value means unlimited.
    pub fn from_count(count: i64) -> Self {
        if count < 0 {
            Self::Unlimited
        } else {
            Self::Limited(u32::try_from(count).unwrap_or(u32::MAX))
        }
    }

    fn allows(self, retries_used: u32) -> bool {
        match self {
            Self::Limited(max) => retries_used < max,
            Self::Unlimited => true,
        }
    }
}

/// Retry policy configuration.
///
/// A failure whose [`ErrorKind`] is listed in `retry_on` is logged and the
/// operation is invoked again, up to `retries` more times. Any other failure
/// is returned immediately. Once retries are exhausted the last failure is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: Retries,
    pub retry_on: Vec<ErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::transient(Retries::Limited(1))
    }
}

impl RetryPolicy {
    pub fn new(retries: Retries, retry_on: impl IntoIterator<Item = ErrorKind>) -> Self {
        Self {
            retries,
            retry_on: retry_on.into_iter().collect(),
        }
    }

    /// Policy that only re-attempts transient transport failures.
    pub fn transient(retries: Retries) -> Self {
        Self::new(retries, [ErrorKind::Transport])
    }

    pub fn should_retry(&self, error: &GauthError) -> bool {
        self.retry_on.contains(&error.kind())
    }

    /// Execute an async operation with retry.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, GauthError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GauthError>>,
    {
        let mut retries_used: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !self.should_retry(&e) || !self.retries.allows(retries_used) {
                        return Err(e);
                    }
                    retries_used = retries_used.saturating_add(1);
                    tracing::warn!(
                        attempt = retries_used,
                        kind = %e.kind(),
                        error = %e,
                        "Retrying after error"
                    );
                }
            }
        }
    }
}
