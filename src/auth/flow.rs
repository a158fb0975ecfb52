//! Interactive authorization-code bootstrap.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use bon::Builder;
use serde::Deserialize;

use super::credential::{Credential, CredentialStore, StoreOptions};
use crate::error::{GauthError, Result};
use crate::transport::{ApiRequest, RequestOptions};

/// User-facing side of the authorization flow.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Open `url` in a browser.
    async fn open_url(&self, url: &str) -> Result<()>;
    /// Show a message to the user.
    async fn show(&self, message: &str) -> Result<()>;
    /// Show `prompt` and wait for one line of input. No timeout.
    async fn read_line(&self, prompt: &str) -> Result<String>;
}

/// Terminal interaction: stdout, stdin and the platform's URL opener.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleInteraction;

#[async_trait]
impl Interaction for ConsoleInteraction {
    async fn open_url(&self, url: &str) -> Result<()> {
        let (program, args) = url_launcher(std::env::consts::OS);
        // Launchers hand the URL to the browser and exit; waiting reaps them.
        let status = tokio::process::Command::new(program)
            .args(args)
            .arg(url)
            .status()
            .await
            .map_err(|e| GauthError::Interaction(format!("failed to open browser: {e}")))?;
        if !status.success() {
            return Err(GauthError::Interaction(format!(
                "browser launcher {program} exited with {status}"
            )));
        }
        Ok(())
    }

    async fn show(&self, message: &str) -> Result<()> {
        println!("{message}");
        Ok(())
    }

    async fn read_line(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            print!("{prompt}");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| GauthError::Interaction(format!("input task failed: {e}")))?
        .map_err(|e| GauthError::Interaction(format!("failed to read input: {e}")))
    }
}

/// Program and leading arguments that open a URL on `os`.
///
/// `start` is a `cmd` builtin, so Windows goes through `cmd /C start ""`.
fn url_launcher(os: &str) -> (&'static str, &'static [&'static str]) {
    const NO_ARGS: &[&str] = &[];
    const CMD_START: &[&str] = &["/C", "start", ""];
    match os {
        "macos" => ("open", NO_ARGS),
        "windows" => ("cmd", CMD_START),
        _ => ("xdg-open", NO_ARGS),
    }
}

/// Scopes requested during authorization. Accepts a single scope or a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scopes(Vec<String>);

impl Scopes {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Space-joined form sent as the `scope` parameter.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Scopes {
    fn from(scope: &str) -> Self {
        Self(vec![scope.to_string()])
    }
}

impl From<String> for Scopes {
    fn from(scope: String) -> Self {
        Self(vec![scope])
    }
}

impl From<Vec<String>> for Scopes {
    fn from(scopes: Vec<String>) -> Self {
        Self(scopes)
    }
}

impl From<&[&str]> for Scopes {
    fn from(scopes: &[&str]) -> Self {
        Self(scopes.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Scopes {
    fn from(scopes: [&str; N]) -> Self {
        Self(scopes.iter().map(|s| s.to_string()).collect())
    }
}

/// Inputs to [`authorize`].
///
/// # Example
/// ```no_run
/// use gauth::auth::AuthorizeParams;
///
/// let params = AuthorizeParams::builder()
///     .scopes("https://www.googleapis.com/auth/drive.readonly")
///     .client_id("client-id")
///     .client_secret("client-secret")
///     .email("user@example.com")
///     .filename("credentials.json")
///     .interactive(false)
///     .build();
/// ```
#[derive(Debug, Clone, Builder)]
pub struct AuthorizeParams {
    #[builder(into)]
    pub scopes: Scopes,
    #[builder(into)]
    pub client_id: String,
    #[builder(into)]
    pub client_secret: String,
    #[builder(into)]
    pub email: String,
    #[builder(into)]
    pub filename: PathBuf,
    /// Open the browser (`true`) or only print the URL (`false`).
    #[builder(default = true)]
    pub interactive: bool,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
    refresh_token: String,
}

/// Run the authorization-code flow and return a saved [`CredentialStore`].
///
/// 1. Ask the authorization endpoint for the consent URL. A non-success
///    answer fails before the user is prompted.
/// 2. Open the URL (or print it when `interactive` is off or the browser
///    cannot be opened).
/// 3. Read the authorization code the user pastes back.
/// 4. Exchange it at the token endpoint and persist the result.
pub async fn authorize(
    params: AuthorizeParams,
    interaction: &dyn Interaction,
    options: StoreOptions,
) -> Result<CredentialStore> {
    let endpoints = options.endpoints.clone();
    let transport = options.transport.clone();

    let consent_options = RequestOptions::new()
        .query("client_id", params.client_id.as_str())
        .query("response_type", "code")
        .query("redirect_uri", endpoints.redirect_uri.as_str())
        .query("scope", params.scopes.joined())
        .query("login_hint", params.email.as_str());
    let consent = transport
        .send(ApiRequest::get(endpoints.authorization_url.as_str()).with_options(consent_options))
        .await?;
    if !consent.is_success() {
        return Err(GauthError::authorization(consent.status_code(), consent.text()));
    }
    let consent_url = consent.url().to_string();

    let mut opened = false;
    if params.interactive {
        match interaction.open_url(&consent_url).await {
            Ok(()) => opened = true,
            Err(e) => tracing::warn!(error = %e, "Could not open browser; printing URL instead"),
        }
    }
    if !opened {
        interaction
            .show(&format!("Open the following url: {consent_url}"))
            .await?;
    }

    let code = interaction
        .read_line("Enter the resulting authorization code: ")
        .await?;
    let code = code.trim();
    if code.is_empty() {
        return Err(GauthError::Interaction("no authorization code entered".to_string()));
    }

    let exchange_options = RequestOptions::new().form([
        ("code", code),
        ("client_id", params.client_id.as_str()),
        ("client_secret", params.client_secret.as_str()),
        ("redirect_uri", endpoints.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ]);
    let exchange = transport
        .send(ApiRequest::post(endpoints.token_url.as_str()).with_options(exchange_options))
        .await?;
    if !exchange.is_success() {
        return Err(GauthError::authorization(exchange.status_code(), exchange.text()));
    }
    let tokens: TokenExchangeResponse = exchange.json()?;

    let credential = Credential::new(
        params.client_id,
        params.client_secret,
        params.scopes.into_vec(),
        params.email,
        params.filename,
        tokens.access_token,
        tokens.refresh_token,
    )?;
    let store = CredentialStore::create_with(credential, options)?;
    tracing::info!(email = %store.email(), path = %store.location().display(), "Authorized account");
    Ok(store)
}

impl CredentialStore {
    /// [`authorize`] with the console interaction and default collaborators.
    pub async fn authorize(params: AuthorizeParams) -> Result<Self> {
        authorize(params, &ConsoleInteraction, StoreOptions::default()).await
    }
}
