//! CLI handlers for login, refresh and status.

use crate::auth::{authorize, AuthorizeParams, ConsoleInteraction, CredentialStore, StoreOptions};
use crate::config::GauthConfig;
use crate::error::GauthError;

use super::LoginArgs;

/// Handle `gauth login`.
pub async fn handle_login(
    config: &GauthConfig,
    args: LoginArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let client_id = args
        .client_id
        .or_else(|| config.client_id.clone())
        .ok_or_else(|| missing("--client-id", crate::config::ENV_CLIENT_ID))?;
    let client_secret = args
        .client_secret
        .or_else(|| config.client_secret.clone())
        .ok_or_else(|| missing("--client-secret", crate::config::ENV_CLIENT_SECRET))?;

    let params = AuthorizeParams::builder()
        .scopes(args.scopes)
        .client_id(client_id)
        .client_secret(client_secret)
        .email(args.email)
        .filename(config.credentials_path.clone())
        .interactive(!args.no_browser)
        .build();
    let options = store_options(config)?;

    let store = authorize(params, &ConsoleInteraction, options).await?;
    println!("✅ Authorized {}", store.email());
    println!("   Saved to {}", store.location().display());
    Ok(())
}

/// Handle `gauth refresh`.
pub async fn handle_refresh(config: &GauthConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = CredentialStore::load_with(&config.credentials_path, store_options(config)?)?;
    store.refresh().await?;
    println!("✅ Refreshed access token for {}", store.email());
    Ok(())
}

/// Handle `gauth status`.
pub async fn handle_status(config: &GauthConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = match CredentialStore::load_with(&config.credentials_path, store_options(config)?) {
        Ok(store) => store,
        Err(GauthError::Persistence { path, .. }) => {
            println!("❌ No credential at {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let credential = store.credential();

    println!("🔐 Credential {}\n", store.location().display());
    println!("  Account:   {}", credential.email);
    println!("  Client:    {}", credential.client_id);
    println!("  Scopes:    {}", credential.scopes.join(" "));
    println!("  Token:     {}", mask(&credential.access_token));
    Ok(())
}

pub(crate) fn store_options(config: &GauthConfig) -> Result<StoreOptions, GauthError> {
    Ok(StoreOptions::builder().transport(config.transport()?).build())
}

fn missing(flag: &str, env: &str) -> GauthError {
    GauthError::Configuration(format!("{flag} is required (or set {env})"))
}

fn mask(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    format!("{visible}…")
}
