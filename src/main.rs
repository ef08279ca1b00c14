use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use tracing::info;
use twin_intake::cli::{handle_command, TwinCli};
use twin_intake::core::ConfigManager;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "twin_intake=info,rocket::server=off";

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Invalid log filter")?;

    match std::env::var("TWIN_LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true) // Clear file on startup
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path))?;

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(file)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false))
                .with(filter)
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    init_logging()?;

    let cli = TwinCli::parse();
    let config = ConfigManager::load()?;

    info!(
        "Environment: {}",
        std::env::var("TWIN_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    );
    info!("Backend: {}", config.backend_url);
    info!("Export directory: {}", config.export_dir.display());

    handle_command(cli, config).await
}
