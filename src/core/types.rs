//! Value types passed between the command builder, the executor and the
//! response interpreter.

use serde::Serialize;
use std::path::PathBuf;

/// Opaque identifier minted by the Claude CLI for a conversation
pub type SessionId = String;

/// Which command form to build for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Always start a fresh conversation
    New,
    /// Resume a conversation, either by id or the most recent one
    Continue,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::New => write!(f, "new"),
            Mode::Continue => write!(f, "continue"),
        }
    }
}

/// One conversational turn to send to the Claude CLI
///
/// # Examples
///
/// ```rust
/// use claude_code_mcp::ConversationRequest;
///
/// let request = ConversationRequest::new("Summarise the README")
///     .with_model("sonnet")
///     .with_continuation_id("5f1c2a");
/// assert_eq!(request.continuation_id.as_deref(), Some("5f1c2a"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub cwd: Option<PathBuf>,
    pub continuation_id: Option<SessionId>,
}

impl ConversationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_continuation_id(mut self, continuation_id: impl Into<SessionId>) -> Self {
        self.continuation_id = Some(continuation_id.into());
        self
    }
}

/// Captured output of a successful CLI run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Accounting fields the CLI reports alongside a result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_turns: Option<u32>,
}

impl ResponseMetadata {
    pub fn is_empty(&self) -> bool {
        self.cost_usd.is_none() && self.duration_ms.is_none() && self.num_turns.is_none()
    }
}

/// Uniform result of one turn, regardless of how the CLI answered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpretedResponse {
    /// Human-readable response text
    pub response: String,
    /// Continuation identifier to pass to the next turn
    pub session_id: Option<SessionId>,
    /// Whether the CLI flagged the turn as failed
    pub is_error: bool,
    /// Cost and timing details, when the CLI reported any
    pub metadata: Option<ResponseMetadata>,
}

impl InterpretedResponse {
    /// A response built from plain text output
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }
}
