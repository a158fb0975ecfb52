//! CLI handler for `gauth request`.

use std::sync::Arc;

use reqwest::Method;

use crate::auth::CredentialStore;
use crate::client::AuthorizingClient;
use crate::config::GauthConfig;
use crate::error::GauthError;
use crate::transport::RequestOptions;

use super::auth::store_options;
use super::RequestArgs;

/// Handle `gauth request <METHOD> <URL>`.
pub async fn handle_request(
    config: &GauthConfig,
    args: RequestArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let method = parse_method(&args.method)?;
    let options = build_options(&args)?;

    let store = CredentialStore::load_with(&config.credentials_path, store_options(config)?)?;
    let client = AuthorizingClient::new(Arc::new(store)).with_retry_policy(config.retry_policy());

    let response = client.request(method, args.url, options).await?;
    eprintln!("HTTP {}", response.status());
    println!("{}", response.text());

    if args.fail {
        response.error_for_status()?;
    }
    Ok(())
}

fn parse_method(raw: &str) -> Result<Method, GauthError> {
    match raw.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        "PATCH" => Ok(Method::PATCH),
        other => Err(GauthError::InvalidRequest(format!(
            "unsupported method {other} (supported: GET, POST, PUT, DELETE, PATCH)"
        ))),
    }
}

fn build_options(args: &RequestArgs) -> Result<RequestOptions, GauthError> {
    let mut options = RequestOptions::new();
    for header in &args.headers {
        let (name, value) = header.split_once(':').ok_or_else(|| {
            GauthError::InvalidRequest(format!("header must look like `Name: value`, got {header:?}"))
        })?;
        options = options.try_header(name.trim(), value.trim())?;
    }
    for pair in &args.query {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            GauthError::InvalidRequest(format!("query must look like `key=value`, got {pair:?}"))
        })?;
        options = options.query(key, value);
    }
    if let Some(data) = &args.data {
        let body: serde_json::Value = serde_json::from_str(data)?;
        options = options.json(body);
    }
    Ok(options)
}
