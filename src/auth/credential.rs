//! The persisted OAuth2 credential and the store that refreshes and saves it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::endpoints::OAuthEndpoints;
use super::sink::{CredentialSink, FileSink};
use crate::error::{GauthError, Result};
use crate::transport::{ApiRequest, HttpTransport, RequestOptions, Transport};

/// One account's OAuth2 credential set, in its on-disk JSON shape.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub email: String,
    pub filename: PathBuf,
    pub access_token: String,
    pub refresh_token: String,
}

impl Credential {
    /// Build a credential, rejecting empty tokens.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scopes: Vec<String>,
        email: impl Into<String>,
        filename: impl Into<PathBuf>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Self> {
        let credential = Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes,
            email: email.into(),
            filename: filename.into(),
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        };
        credential.validate()?;
        Ok(credential)
    }

    fn validate(&self) -> Result<()> {
        if self.access_token.is_empty() {
            return Err(GauthError::Format("access_token must not be empty".to_string()));
        }
        if self.refresh_token.is_empty() {
            return Err(GauthError::Format("refresh_token must not be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"..")
            .field("scopes", &self.scopes)
            .field("email", &self.email)
            .field("filename", &self.filename)
            .field("access_token", &"..")
            .field("refresh_token", &"..")
            .finish()
    }
}

/// Collaborators a [`CredentialStore`] talks to.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use gauth::auth::{FileSink, OAuthEndpoints, StoreOptions};
///
/// let options = StoreOptions::builder()
///     .sink(Arc::new(FileSink))
///     .endpoints(OAuthEndpoints::default().with_token_url("http://127.0.0.1:8080/token"))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct StoreOptions {
    #[builder(default = default_sink())]
    pub sink: Arc<dyn CredentialSink>,
    #[builder(default = default_transport())]
    pub transport: Arc<dyn Transport>,
    #[builder(default)]
    pub endpoints: OAuthEndpoints,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_sink() -> Arc<dyn CredentialSink> {
    Arc::new(FileSink)
}

fn default_transport() -> Arc<dyn Transport> {
    Arc::new(HttpTransport::default())
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

/// Owns a [`Credential`], refreshes its access token and keeps the sink in
/// step with memory.
///
/// The credential sits behind a lock and refreshes are serialized, so one
/// store can be shared across tasks through an `Arc`.
pub struct CredentialStore {
    credential: RwLock<Credential>,
    location: PathBuf,
    sink: Arc<dyn CredentialSink>,
    transport: Arc<dyn Transport>,
    endpoints: OAuthEndpoints,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("credential", &self.credential())
            .field("location", &self.location)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

impl CredentialStore {
    /// Wrap `credential` with the default file sink and HTTP transport, then save it.
    pub fn create(credential: Credential) -> Result<Self> {
        Self::create_with(credential, StoreOptions::default())
    }

    /// Wrap `credential` with the given collaborators, then save it.
    pub fn create_with(credential: Credential, options: StoreOptions) -> Result<Self> {
        credential.validate()?;
        let location = credential.filename.clone();
        let store = Self::from_parts(credential, location, options);
        store.save()?;
        Ok(store)
    }

    /// Restore a credential saved at `location` using the default collaborators.
    pub fn load(location: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(location, StoreOptions::default())
    }

    /// Restore a credential saved at `location`.
    ///
    /// The returned store's location is `location`, whatever `filename` the
    /// file itself records.
    pub fn load_with(location: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let location = location.as_ref();
        let raw = options.sink.read(location)?;
        let mut credential: Credential = serde_json::from_str(&raw).map_err(|e| {
            GauthError::Format(format!(
                "malformed credential file {}: {e}",
                location.display()
            ))
        })?;
        credential.validate()?;
        credential.filename = location.to_path_buf();
        tracing::info!(email = %credential.email, path = %location.display(), "Loaded credential");
        Ok(Self::from_parts(credential, location.to_path_buf(), options))
    }

    fn from_parts(credential: Credential, location: PathBuf, options: StoreOptions) -> Self {
        Self {
            credential: RwLock::new(credential),
            location,
            sink: options.sink,
            transport: options.transport,
            endpoints: options.endpoints,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Snapshot of the current credential.
    pub fn credential(&self) -> Credential {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> String {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token
            .clone()
    }

    pub fn email(&self) -> String {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .email
            .clone()
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn endpoints(&self) -> &OAuthEndpoints {
        &self.endpoints
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Write the full credential to the sink, replacing previous content.
    pub fn save(&self) -> Result<()> {
        self.persist(&self.credential())
    }

    fn persist(&self, credential: &Credential) -> Result<()> {
        let serialized = serde_json::to_string_pretty(credential)?;
        self.sink.write(&self.location, &serialized)?;
        tracing::info!(email = %credential.email, path = %self.location.display(), "Saved credential");
        Ok(())
    }

    /// Exchange the refresh token for a new access token, then save.
    ///
    /// The new token only replaces the in-memory one once it has been
    /// written to the sink; a failed save leaves the store unchanged.
    /// A non-success answer from the token endpoint is returned as
    /// [`GauthError::Authorization`] and is never retried here.
    pub async fn refresh(&self) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refresh after the server rejected `rejected_token`.
    ///
    /// When another task already replaced that token while this one waited
    /// for the refresh lock, the newer token is kept and no request is made.
    pub async fn refresh_rejected(&self, rejected_token: &str) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;
        let current = self.access_token();
        if current != rejected_token {
            tracing::debug!(email = %self.email(), "Access token already refreshed by another request");
            return Ok(current);
        }
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<String> {
        let snapshot = self.credential();
        let options = RequestOptions::new().form([
            ("refresh_token", snapshot.refresh_token.as_str()),
            ("client_id", snapshot.client_id.as_str()),
            ("client_secret", snapshot.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ]);
        let request = ApiRequest::post(self.endpoints.token_url.as_str()).with_options(options);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(GauthError::authorization(response.status_code(), response.text()));
        }
        let payload: RefreshResponse = response.json()?;
        if payload.access_token.is_empty() {
            return Err(GauthError::Format(
                "token endpoint returned an empty access_token".to_string(),
            ));
        }

        let updated = Credential {
            access_token: payload.access_token.clone(),
            ..snapshot
        };
        self.persist(&updated)?;
        *self.credential.write().unwrap_or_else(PoisonError::into_inner) = updated;
        tracing::info!(email = %self.email(), "Refreshed access token");
        Ok(payload.access_token)
    }
}
