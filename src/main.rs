//! gauth CLI binary entry point.

use clap::Parser;
use gauth::cli::{Cli, Commands};
use gauth::config::GauthConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GauthConfig::from_env()?;
    if let Some(path) = cli.credentials {
        config = config.with_credentials_path(path);
    }

    match cli.command {
        Commands::Login(args) => gauth::cli::auth::handle_login(&config, args).await,
        Commands::Refresh => gauth::cli::auth::handle_refresh(&config).await,
        Commands::Status => gauth::cli::auth::handle_status(&config).await,
        Commands::Request(args) => gauth::cli::request::handle_request(&config, args).await,
    }
}

fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
