//! gauth: OAuth2 token lifecycle client for Google APIs.
//!
//! Obtains a token pair through the installed-application authorization-code
//! flow, persists it as JSON, and sends authorized requests that refresh the
//! access token once when the API answers 401.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gauth::prelude::*;
//!
//! # async fn example() -> gauth::error::Result<()> {
//! let store = Arc::new(CredentialStore::load("credentials.json")?);
//! let client = AuthorizingClient::new(store);
//! let response = client
//!     .get("https://www.googleapis.com/oauth2/v3/userinfo", RequestOptions::new())
//!     .await?
//!     .error_for_status()?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod transport;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
