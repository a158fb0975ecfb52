//! Error types for gauth.

use std::path::PathBuf;

use strum::{AsRefStr, Display};
use thiserror::Error;

/// Primary error type for all gauth operations.
#[derive(Error, Debug)]
pub enum GauthError {
    /// Connection, timeout or body-read failure. The only transient kind.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success answer from the authorization or token endpoint.
    #[error("Authorization failed (status {status}): {body}")]
    Authorization { status: u16, body: String },

    /// Non-success status raised through [`ApiResponse::error_for_status`](crate::transport::ApiResponse::error_for_status).
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Persistence error at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Interaction error: {0}")]
    Interaction(String),
}

/// Coarse classification used by [`RetryPolicy`](crate::util::retry::RetryPolicy)
/// to decide which failures are re-attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Authorization,
    Status,
    Persistence,
    Format,
    InvalidRequest,
    Configuration,
    Interaction,
}

impl GauthError {
    /// Authorization failure carrying the endpoint's response body.
    pub fn authorization(status: u16, body: &str) -> Self {
        Self::Authorization {
            status,
            body: describe_body(body),
        }
    }

    /// Generic HTTP status failure carrying the response body.
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: describe_body(body),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::Status { .. } => ErrorKind::Status,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Format(_) => ErrorKind::Format,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Interaction(_) => ErrorKind::Interaction,
        }
    }

    /// Whether this error is a transient transport failure.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl From<reqwest::Error> for GauthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            Self::InvalidRequest(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for GauthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Format(error.to_string())
    }
}

/// Pretty-print a JSON body, falling back to the raw text.
fn describe_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GauthError>;
