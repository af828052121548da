use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Error type shared by the command builder, the executor and the MCP layer
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Claude CLI not found: {0}. Install it with 'npm install -g @anthropic-ai/claude-code' or set --claude-bin")]
    BinaryNotFound(String),

    #[error("Working directory does not exist: {}", .0.display())]
    InvalidWorkingDirectory(PathBuf),

    #[error("{message}")]
    ProcessFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Claude CLI timed out after {timeout:?}{}", diagnostic(.stderr))]
    Timeout {
        timeout: Duration,
        stderr: Option<String>,
    },

    #[error("Claude CLI output exceeded the {limit} byte limit{}", diagnostic(.stderr))]
    OutputLimitExceeded {
        limit: usize,
        stderr: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a protocol error
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build a process failure from an exit code and captured stderr.
    ///
    /// Empty stderr is dropped so callers can rely on `Some` meaning
    /// there is something worth showing.
    pub fn process_failed(exit_code: Option<i32>, stderr: &str) -> Self {
        let stderr = stderr.trim();
        let message = match (exit_code, stderr.is_empty()) {
            (Some(code), true) => format!("Claude CLI exited with status {}", code),
            (Some(code), false) => format!("Claude CLI exited with status {}: {}", code, stderr),
            (None, true) => "Claude CLI was terminated by a signal".to_string(),
            (None, false) => format!("Claude CLI was terminated by a signal: {}", stderr),
        };

        Self::ProcessFailed {
            message,
            stderr: captured(stderr),
            exit_code,
        }
    }

    /// The CLI ran past its deadline and was killed
    pub fn timeout(timeout: Duration, stderr: &str) -> Self {
        Self::Timeout {
            timeout,
            stderr: captured(stderr),
        }
    }

    /// The CLI wrote more than `limit` bytes and was killed
    pub fn output_limit_exceeded(limit: usize, stderr: &str) -> Self {
        Self::OutputLimitExceeded {
            limit,
            stderr: captured(stderr),
        }
    }

    /// Whether the request was rejected before any subprocess was spawned
    pub fn is_build_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if a caller could reasonably retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }

    /// Diagnostic output the CLI wrote before it failed
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ProcessFailed { stderr, .. }
            | Self::Timeout { stderr, .. }
            | Self::OutputLimitExceeded { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// Exit status of the subprocess, when it ran to completion
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ProcessFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

/// Trimmed stderr, or `None` when there is nothing worth showing
fn captured(stderr: &str) -> Option<String> {
    let stderr = stderr.trim();
    (!stderr.is_empty()).then(|| stderr.to_string())
}

fn diagnostic(stderr: &Option<String>) -> String {
    match stderr {
        Some(stderr) => format!(": {}", stderr),
        None => String::new(),
    }
}

/// Convenient result type for the crate
pub type Result<T> = std::result::Result<T, Error>;
