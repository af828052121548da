use crate::cli::config::Settings;
use crate::core::Result;
use crate::mcp::{serve_stdio, McpServer};
use crate::runtime::{resolve_program, Client};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// MCP server exposing Claude Code conversations over stdio
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, env = "CLAUDE_CODE_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Claude CLI program name or path
    #[arg(long, env = "CLAUDE_CODE_MCP_BIN")]
    pub claude_bin: Option<String>,

    /// Timeout for each Claude CLI invocation in seconds
    #[arg(long, env = "CLAUDE_CODE_MCP_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Ceiling on combined Claude CLI output in bytes
    #[arg(long, env = "CLAUDE_CODE_MCP_MAX_OUTPUT")]
    pub max_output_bytes: Option<usize>,

    /// Log filter directive written to stderr, e.g. "debug"
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Load the settings file and apply command-line overrides
    pub fn settings(&self) -> Result<Settings> {
        Ok(Settings::load(self.config.as_deref())?.merge_with_cli_args(self))
    }

    /// Run the MCP server until stdin closes
    pub async fn run(settings: Settings) -> Result<()> {
        let config = settings.to_config()?;

        info!(
            version = crate::VERSION,
            binary = %config.binary,
            timeout_secs = config.timeout_secs,
            max_output_bytes = config.max_output_bytes,
            "Starting claude-code-mcp"
        );

        // Calls fail individually if the CLI is missing; startup does not.
        match resolve_program(&config.binary) {
            Ok(path) => info!(path = %path.display(), "Resolved Claude CLI"),
            Err(e) => warn!(error = %e, "Claude CLI is not available yet"),
        }

        let server = McpServer::new(Client::new(config));
        serve_stdio(server).await?;

        info!("Input closed, shutting down");
        Ok(())
    }
}
