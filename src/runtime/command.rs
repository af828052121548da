//! Command line construction for the Claude CLI.
//!
//! Requests are turned into a [`CommandLine`]: a program plus an argument
//! vector in which every argument remembers whether it must be quoted when the
//! line is rendered for a shell. Keeping the unquoted values around lets the
//! executor run the same command either through `sh -c` or directly.

use crate::core::{validate_request, Config, ConversationRequest, Mode, Result};
use std::fmt;

/// Requests machine-readable output from the CLI
pub const OUTPUT_FORMAT_FLAG: &str = "--output-format";
pub const OUTPUT_FORMAT_JSON: &str = "json";
pub const PRINT_FLAG: &str = "-p";
pub const CONTINUE_FLAG: &str = "-c";
pub const RESUME_FLAG: &str = "-r";
pub const MODEL_FLAG: &str = "--model";
pub const SYSTEM_PROMPT_FLAG: &str = "--system-prompt";
pub const APPEND_SYSTEM_PROMPT_FLAG: &str = "--append-system-prompt";

/// A single argument and how it is written on a shell command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Written verbatim (flags, model tokens, simple identifiers)
    Raw(String),
    /// Always single-quoted (free text such as prompts)
    Quoted(String),
}

impl Arg {
    /// The value the child process receives
    pub fn as_str(&self) -> &str {
        match self {
            Arg::Raw(value) | Arg::Quoted(value) => value,
        }
    }

    fn render(&self) -> String {
        match self {
            Arg::Raw(value) => value.clone(),
            Arg::Quoted(value) => shell_quote(value),
        }
    }
}

/// Quote text so a POSIX shell yields it back as exactly one argument.
///
/// The text is wrapped in single quotes, inside which the shell performs no
/// expansion at all. An embedded single quote closes the quoted run, emits an
/// escaped quote and reopens it (`'\''`).
///
/// ```rust
/// use claude_code_mcp::runtime::shell_quote;
///
/// assert_eq!(shell_quote("it's"), r#"'it'\''s'"#);
/// assert_eq!(shell_quote(""), "''");
/// ```
pub fn shell_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Whether a token can appear on a shell command line without quoting
pub fn is_shell_safe(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '/' | '@' | '=' | '+' | ','))
}

/// Quote a token only when it needs it
pub fn quote_if_needed(token: &str) -> String {
    if is_shell_safe(token) {
        token.to_string()
    } else {
        shell_quote(token)
    }
}

/// An assembled Claude CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<Arg>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument written verbatim
    pub fn raw(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::Raw(value.into()));
        self
    }

    /// Append an argument that is always quoted
    pub fn quoted(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::Quoted(value.into()));
        self
    }

    /// Append an opaque token, quoted only when it is not shell-safe
    pub fn token(self, value: impl Into<String>) -> Self {
        let value = value.into();
        if is_shell_safe(&value) {
            self.raw(value)
        } else {
            self.quoted(value)
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Argument values as the child process receives them
    pub fn argv(&self) -> Vec<&str> {
        self.args.iter().map(Arg::as_str).collect()
    }

    /// Replace the program, e.g. with a resolved absolute path
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Whether the given flag appears as an argument
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args
            .iter()
            .any(|arg| matches!(arg, Arg::Raw(value) if value == flag))
    }

    /// The value following a flag, if the flag is present
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| matches!(arg, Arg::Raw(value) if value == flag))
            .and_then(|idx| self.args.get(idx + 1))
            .map(Arg::as_str)
    }

    /// Render the invocation as a single shell command line
    pub fn render(&self) -> String {
        let mut line = quote_if_needed(&self.program);
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.render());
        }
        line
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Build the Claude CLI invocation for one turn.
///
/// ```text
/// <tool> -p <prompt> --output-format json [--model <m>] [--system-prompt <s>]
/// <tool> -c -p <prompt> --output-format json [--model <m>] [--append-system-prompt <s>]
/// <tool> -r <id> -p <prompt> --output-format json [--model <m>] [--append-system-prompt <s>]
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidInput`](crate::core::Error::InvalidInput) when the
/// request fails validation; nothing is spawned in that case.
pub fn build_command(
    config: &Config,
    request: &ConversationRequest,
    mode: Mode,
) -> Result<CommandLine> {
    validate_request(request, mode)?;

    let mut command = CommandLine::new(config.binary.clone());

    if mode == Mode::Continue {
        command = match &request.continuation_id {
            Some(id) => command.raw(RESUME_FLAG).token(id.clone()),
            None => command.raw(CONTINUE_FLAG),
        };
    }

    command = command
        .raw(PRINT_FLAG)
        .quoted(request.prompt.clone())
        .raw(OUTPUT_FORMAT_FLAG)
        .raw(OUTPUT_FORMAT_JSON);

    if let Some(model) = &request.model {
        command = command.raw(MODEL_FLAG).token(model.clone());
    }

    if let Some(system_prompt) = &request.system_prompt {
        // A continuation layers guidance onto the existing system prompt.
        let flag = match mode {
            Mode::New => SYSTEM_PROMPT_FLAG,
            Mode::Continue => APPEND_SYSTEM_PROMPT_FLAG,
        };
        command = command.raw(flag).quoted(system_prompt.clone());
    }

    Ok(command)
}

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;
