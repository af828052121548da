use anyhow::{Context, Result};
use clap::Parser;
use claude_code_mcp::cli::{Cli, DEFAULT_LOG_LEVEL};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings().context("Failed to load settings")?;

    // stdout carries the protocol, so logs go to stderr
    let filter = match settings.logging.level.as_deref() {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    if let Err(e) = Cli::run(settings).await {
        error!("Server stopped: {:?}", e);
        return Err(e.into());
    }

    info!("Server exited cleanly");
    Ok(())
}
