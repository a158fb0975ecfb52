//! Authorized request execution with one refresh-and-replay on 401.
//!
//! Layers, outermost first:
//!
//! 1. [`RetryPolicy`] for transient transport failures (2 retries by default).
//! 2. [`with_authorization`]: attach the bearer token; on 401 refresh once and
//!    replay once.
//! 3. The [`Transport`].
//!
//! A transport failure during the replay counts against the retry budget of
//! layer 1. It does not start a new refresh cycle.

use std::future::Future;
use std::sync::Arc;

use reqwest::Method;

use crate::auth::CredentialStore;
use crate::error::Result;
use crate::transport::{ApiRequest, ApiResponse, RequestOptions, Transport};
use crate::util::retry::{Retries, RetryPolicy};

/// Transport retries applied around each authorized request.
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 2;

/// Per-request protocol state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    /// Token assumed valid.
    Authorized,
    /// The first attempt got 401 and the token was refreshed; the replay's
    /// outcome is final.
    RetryAfterRefresh,
}

/// Run `send` with the credential's bearer token attached.
///
/// Without a credential, `send` runs once with `options` untouched. With one,
/// a 401 answer triggers exactly one refresh and one replay, and the replay's
/// response is returned whatever its status.
///
/// # Example
/// ```no_run
/// use gauth::auth::CredentialStore;
/// use gauth::client::with_authorization;
/// use gauth::transport::{ApiRequest, HttpTransport, RequestOptions, Transport};
///
/// # async fn example(store: &CredentialStore) -> gauth::error::Result<()> {
/// let transport = HttpTransport::default();
/// let url = "https://www.googleapis.com/drive/v3/files";
/// let response = with_authorization(Some(store), RequestOptions::new(), |options| {
///     transport.send(ApiRequest::get(url).with_options(options))
/// })
/// .await?;
/// println!("{}", response.status_code());
/// # Ok(())
/// # }
/// ```
pub async fn with_authorization<F, Fut>(
    credential: Option<&CredentialStore>,
    options: RequestOptions,
    send: F,
) -> Result<ApiResponse>
where
    F: Fn(RequestOptions) -> Fut,
    Fut: Future<Output = Result<ApiResponse>>,
{
    let Some(store) = credential else {
        return send(options).await;
    };

    let mut state = AuthState::Authorized;
    loop {
        let token = store.access_token();
        let response = send(options.with_bearer(&token)?).await?;
        match state {
            AuthState::Authorized if response.is_unauthorized() => {
                tracing::debug!(email = %store.email(), "Access token rejected; refreshing");
                store.refresh_rejected(&token).await?;
                state = AuthState::RetryAfterRefresh;
            }
            AuthState::Authorized | AuthState::RetryAfterRefresh => return Ok(response),
        }
    }
}

/// [`with_authorization`] wrapped in the default transient-failure retry.
pub async fn authorized_request<F, Fut>(
    credential: Option<&CredentialStore>,
    options: RequestOptions,
    send: F,
) -> Result<ApiResponse>
where
    F: Fn(RequestOptions) -> Fut,
    Fut: Future<Output = Result<ApiResponse>>,
{
    let send = &send;
    RetryPolicy::transient(Retries::Limited(DEFAULT_TRANSPORT_RETRIES))
        .execute(|| with_authorization(credential, options.clone(), send))
        .await
}

/// HTTP client bound to one [`CredentialStore`].
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use gauth::auth::CredentialStore;
/// use gauth::client::AuthorizingClient;
/// use gauth::transport::RequestOptions;
///
/// # async fn example() -> gauth::error::Result<()> {
/// let store = Arc::new(CredentialStore::load("credentials.json")?);
/// let client = AuthorizingClient::new(store);
/// let response = client
///     .get("https://www.googleapis.com/oauth2/v3/userinfo", RequestOptions::new())
///     .await?;
/// println!("{}", response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthorizingClient {
    store: Arc<CredentialStore>,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for AuthorizingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizingClient")
            .field("store", &self.store)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl AuthorizingClient {
    /// Client that sends through the store's own transport.
    pub fn new(store: Arc<CredentialStore>) -> Self {
        let transport = store.transport().clone();
        Self {
            store,
            transport,
            retry: RetryPolicy::transient(Retries::Limited(DEFAULT_TRANSPORT_RETRIES)),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub async fn get(&self, url: impl Into<String>, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::GET, url, options).await
    }

    pub async fn post(&self, url: impl Into<String>, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::POST, url, options).await
    }

    pub async fn put(&self, url: impl Into<String>, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::PUT, url, options).await
    }

    pub async fn delete(&self, url: impl Into<String>, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::DELETE, url, options).await
    }

    pub async fn patch(&self, url: impl Into<String>, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::PATCH, url, options).await
    }

    /// Send an authorized request with any method.
    pub async fn request(
        &self,
        method: Method,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        let url = url.into();
        let send = |options: RequestOptions| {
            self.transport
                .send(ApiRequest::new(method.clone(), url.as_str(), options))
        };
        let send = &send;
        let store = Some(self.store.as_ref());
        self.retry
            .execute(|| with_authorization(store, options.clone(), send))
            .await
    }
}
