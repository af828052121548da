//! Subprocess execution for the Claude CLI.
//!
//! [`CommandExecutor`] is the seam between building a command and running it:
//! a command goes in, captured text comes out. [`ProcessExecutor`] is the real
//! implementation; tests substitute their own.

use crate::core::{Config, Error, ExecutionOutput, Result};
use crate::runtime::command::CommandLine;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Per-invocation execution limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Working directory for the child; inherits ours when `None`
    pub cwd: Option<PathBuf>,
    /// Wall-clock deadline
    pub timeout: Duration,
    /// Ceiling on combined stdout + stderr bytes
    pub max_output_bytes: usize,
}

impl ExecOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cwd: None,
            timeout: config.timeout(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }
}

/// Runs an assembled command and returns its captured output
#[async_trait]
pub trait CommandExecutor: Send + Sync + std::fmt::Debug {
    /// Run the command to completion.
    ///
    /// Returns the captured output on a zero exit status. A non-zero exit,
    /// an exceeded deadline or an exceeded output ceiling is an error.
    async fn execute(&self, command: &CommandLine, options: &ExecOptions)
        -> Result<ExecutionOutput>;
}

/// Executes commands as real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    shell: Option<String>,
}

impl ProcessExecutor {
    /// Run rendered command lines through `shell -c`
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: Some(shell.into()),
        }
    }

    /// Spawn programs directly with their argument vector
    pub fn direct() -> Self {
        Self { shell: None }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            shell: config.shell.clone(),
        }
    }

    fn spawn(&self, command: &CommandLine, cwd: Option<&Path>) -> Result<Child> {
        let program = resolve_program(command.program())?;
        let command = command.clone().with_program(program.to_string_lossy());

        let mut cmd = match &self.shell {
            Some(shell) => {
                let mut cmd = Command::new(shell);
                cmd.arg("-c").arg(command.render());
                cmd
            }
            None => {
                let mut cmd = Command::new(command.program());
                cmd.args(command.argv());
                cmd
            }
        };

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        // The CLI must never wait on interactive input.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::BinaryNotFound(command.program().to_string())
            } else {
                Error::Io(e)
            }
        })
    }
}

/// Resolve a program name against `PATH`
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| Error::BinaryNotFound(program.to_string()))
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(
        &self,
        command: &CommandLine,
        options: &ExecOptions,
    ) -> Result<ExecutionOutput> {
        if let Some(dir) = &options.cwd {
            if !dir.is_dir() {
                return Err(Error::InvalidWorkingDirectory(dir.clone()));
            }
        }

        debug!(
            command = %command,
            cwd = ?options.cwd,
            timeout = ?options.timeout,
            "Spawning Claude CLI"
        );

        let mut child = self.spawn(command, options.cwd.as_deref())?;

        // The buffers live here so output captured before a kill survives.
        let mut out = Vec::new();
        let mut err = Vec::new();

        let collected = tokio::time::timeout(
            options.timeout,
            collect_output(&mut child, &mut out, &mut err, options.max_output_bytes),
        )
        .await;

        let exit_code = match collected {
            Ok(Ok(exit_code)) => exit_code,
            Ok(Err(e)) => {
                let _ = child.kill().await;
                return Err(e);
            }
            Err(_) => {
                warn!(
                    timeout = ?options.timeout,
                    "Claude CLI exceeded its deadline, terminating"
                );
                let _ = child.kill().await;
                return Err(Error::timeout(
                    options.timeout,
                    &String::from_utf8_lossy(&err),
                ));
            }
        };

        let output = ExecutionOutput {
            stdout: String::from_utf8_lossy(&out).into_owned(),
            stderr: String::from_utf8_lossy(&err).into_owned(),
            exit_code,
        };

        if output.exit_code == Some(0) {
            Ok(output)
        } else {
            Err(Error::process_failed(output.exit_code, &output.stderr))
        }
    }
}

/// Drain both pipes into `out` and `err` until the child closes them, then
/// wait for it and return its exit code.
async fn collect_output(
    child: &mut Child,
    out: &mut Vec<u8>,
    err: &mut Vec<u8>,
    max_output_bytes: usize,
) -> Result<Option<i32>> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Io(std::io::Error::other("stdout was not captured")))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Io(std::io::Error::other("stderr was not captured")))?;

    let mut out_done = false;
    let mut err_done = false;

    while !(out_done && err_done) {
        tokio::select! {
            read = read_chunk(&mut stdout, out), if !out_done => {
                out_done = read? == 0;
            }
            read = read_chunk(&mut stderr, err), if !err_done => {
                err_done = read? == 0;
            }
        }

        if out.len() + err.len() > max_output_bytes {
            warn!(
                limit = max_output_bytes,
                "Claude CLI output exceeded the limit, terminating"
            );
            return Err(Error::output_limit_exceeded(
                max_output_bytes,
                &String::from_utf8_lossy(err),
            ));
        }
    }

    let status = child.wait().await?;
    Ok(status.code())
}

async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut Vec<u8>) -> Result<usize> {
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let n = reader.read(&mut chunk).await?;
    buf.extend_from_slice(&chunk[..n]);
    Ok(n)
}

#[cfg(all(test, unix))]
#[path = "process_test.rs"]
mod process_test;
