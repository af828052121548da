//! Test doubles shared by the unit tests

use crate::core::{Error, ExecutionOutput, Result};
use crate::runtime::{CommandExecutor, CommandLine, ExecOptions};
use async_trait::async_trait;
use std::fmt;
use std::sync::Mutex;

type ErrorFactory = Box<dyn Fn() -> Error + Send + Sync>;

enum Reply {
    Stdout(String),
    Fail(ErrorFactory),
}

/// Executor that records every command and answers with a canned reply
pub struct MockExecutor {
    reply: Reply,
    calls: Mutex<Vec<(CommandLine, ExecOptions)>>,
}

impl MockExecutor {
    /// Answer every call with the given stdout
    pub fn replying(stdout: impl Into<String>) -> Self {
        Self {
            reply: Reply::Stdout(stdout.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with a freshly built error
    pub fn failing(error: impl Fn() -> Error + Send + Sync + 'static) -> Self {
        Self {
            reply: Reply::Fail(Box::new(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(CommandLine, ExecOptions)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<(CommandLine, ExecOptions)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl fmt::Debug for MockExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockExecutor")
            .field("calls", &self.calls.lock().map(|c| c.len()).unwrap_or(0))
            .finish()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(
        &self,
        command: &CommandLine,
        options: &ExecOptions,
    ) -> Result<ExecutionOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((command.clone(), options.clone()));

        match &self.reply {
            Reply::Stdout(stdout) => Ok(ExecutionOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
                exit_code: Some(0),
            }),
            Reply::Fail(error) => Err(error()),
        }
    }
}
