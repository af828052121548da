//! Command-line front end for the claude-code-mcp binary.
//!
//! ## Usage
//!
//! ```bash
//! # Serve on stdio with defaults
//! claude-code-mcp
//!
//! # Point at a specific CLI build and allow longer turns
//! claude-code-mcp --claude-bin ~/.local/bin/claude --timeout 900
//!
//! # Verbose logs (always on stderr)
//! claude-code-mcp --log-level debug
//! ```

pub mod app;
pub mod config;

pub use app::Cli;
pub use config::Settings;

/// Default log filter when neither `RUST_LOG` nor a setting names one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Directory holding the settings file
pub fn default_config_dir() -> std::path::PathBuf {
    directories::ProjectDirs::from("", "", "claude-code-mcp")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from(".claude-code-mcp"))
}
