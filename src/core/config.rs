use crate::core::error::{Error, Result};
use std::time::Duration;

/// Default executable name of the Claude CLI
pub const DEFAULT_BINARY: &str = "claude";

/// Default wall-clock limit for a single CLI invocation (5 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default ceiling on combined stdout + stderr (10 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Execution settings for invoking the Claude CLI
///
/// # Examples
///
/// ```rust
/// use claude_code_mcp::Config;
///
/// let config = Config::builder()
///     .binary("/usr/local/bin/claude")
///     .timeout_secs(120)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout_secs, 120);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Program name or path of the Claude CLI
    pub binary: String,
    /// Wall-clock limit per invocation in seconds
    pub timeout_secs: u64,
    /// Combined stdout + stderr ceiling in bytes
    pub max_output_bytes: usize,
    /// Shell used to run the rendered command line. `None` spawns the
    /// program directly with its argument vector.
    pub shell: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            shell: default_shell(),
        }
    }
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The invocation deadline as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.binary.trim().is_empty() {
            return Err(Error::configuration("binary must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration("timeout_secs must be greater than zero"));
        }
        if self.max_output_bytes == 0 {
            return Err(Error::configuration(
                "max_output_bytes must be greater than zero",
            ));
        }
        if let Some(shell) = &self.shell {
            if shell.trim().is_empty() {
                return Err(Error::configuration("shell must not be empty when set"));
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
fn default_shell() -> Option<String> {
    Some("sh".to_string())
}

#[cfg(not(unix))]
fn default_shell() -> Option<String> {
    None
}

/// Fluent builder for [`Config`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the Claude CLI program name or path
    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.config.binary = binary.into();
        self
    }

    /// Set the timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the combined output ceiling in bytes
    pub fn max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.config.max_output_bytes = max_output_bytes;
        self
    }

    /// Run the command line through the given shell
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.config.shell = Some(shell.into());
        self
    }

    /// Spawn the program directly instead of going through a shell
    pub fn no_shell(mut self) -> Self {
        self.config.shell = None;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
