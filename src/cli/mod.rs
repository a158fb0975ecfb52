//! CLI entry point for gauth.

pub mod auth;
pub mod request;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// gauth CLI
#[derive(Parser, Debug)]
#[command(name = "gauth", version, about = "OAuth2 token manager for Google APIs")]
pub struct Cli {
    /// Credential file (defaults to GAUTH_CREDENTIALS or ~/.gauth/credentials.json)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Log filter, e.g. `info` or `gauth=debug` (falls back to RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize an account and save its credential
    Login(LoginArgs),
    /// Refresh the saved access token
    Refresh,
    /// Show the saved credential
    Status,
    /// Send an authorized request
    Request(RequestArgs),
}

/// Arguments for `gauth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Account email used as login hint
    #[arg(long)]
    pub email: String,

    /// Scope to request (repeatable)
    #[arg(long = "scope", required = true)]
    pub scopes: Vec<String>,

    /// OAuth client id (defaults to GAUTH_CLIENT_ID)
    #[arg(long)]
    pub client_id: Option<String>,

    /// OAuth client secret (defaults to GAUTH_CLIENT_SECRET)
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Print the consent URL instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,
}

/// Arguments for `gauth request`.
#[derive(Parser, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE, PATCH)
    pub method: String,

    /// Target URL
    pub url: String,

    /// Extra header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Query parameter as `key=value` (repeatable)
    #[arg(short, long = "query")]
    pub query: Vec<String>,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Exit with an error when the final status is not a success
    #[arg(long)]
    pub fail: bool,
}
