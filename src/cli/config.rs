use crate::core::{
    Config, Error, Result, DEFAULT_BINARY, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file for the claude-code-mcp server
///
/// ```toml
/// [claude]
/// binary = "/usr/local/bin/claude"
/// timeout_secs = 600
/// max_output_bytes = 20971520
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// How the Claude CLI is invoked
    #[serde(default)]
    pub claude: ClaudeSettings,

    /// Logging preferences
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Claude CLI invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaudeSettings {
    #[serde(default = "default_binary")]
    pub binary: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_output")]
    pub max_output_bytes: usize,

    /// Shell for the rendered command line; empty string spawns directly
    pub shell: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. "info" or "claude_code_mcp=debug"
    pub level: Option<String>,
}

impl Default for ClaudeSettings {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            timeout_secs: default_timeout(),
            max_output_bytes: default_max_output(),
            shell: None,
        }
    }
}

impl Settings {
    /// Load settings from a file that must exist
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Load settings from the default location, falling back to defaults
    /// when no file exists there
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path if given, else from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_default(),
        }
    }

    /// Save settings to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::configuration(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default settings file path
    pub fn default_path() -> PathBuf {
        crate::cli::default_config_dir().join("config.toml")
    }

    /// Merge with command-line arguments, giving priority to CLI args
    pub fn merge_with_cli_args(mut self, cli_args: &crate::cli::app::Cli) -> Self {
        if let Some(binary) = &cli_args.claude_bin {
            self.claude.binary = binary.clone();
        }
        if let Some(timeout) = cli_args.timeout {
            self.claude.timeout_secs = timeout;
        }
        if let Some(max_output) = cli_args.max_output_bytes {
            self.claude.max_output_bytes = max_output;
        }
        if let Some(level) = &cli_args.log_level {
            self.logging.level = Some(level.clone());
        }
        self
    }

    /// Turn the settings into a validated runtime configuration
    pub fn to_config(&self) -> Result<Config> {
        let mut builder = Config::builder()
            .binary(self.claude.binary.clone())
            .timeout_secs(self.claude.timeout_secs)
            .max_output_bytes(self.claude.max_output_bytes);

        builder = match self.claude.shell.as_deref() {
            Some("") => builder.no_shell(),
            Some(shell) => builder.shell(shell),
            None => builder,
        };

        builder.build()
    }
}

// Helper functions for default values
fn default_binary() -> String {
    DEFAULT_BINARY.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_output() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}
