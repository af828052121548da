use crate::core::{Config, ConversationRequest, InterpretedResponse, Mode, Result};
use crate::runtime::command::build_command;
use crate::runtime::process::{CommandExecutor, ExecOptions, ProcessExecutor};
use crate::runtime::response::interpret;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// High-level client for holding conversations through the Claude CLI
///
/// The `Client` turns a [`ConversationRequest`] into a single CLI invocation,
/// runs it through its [`CommandExecutor`] and interprets the output. It keeps
/// no conversation state of its own: multi-turn context lives inside the CLI
/// and is referenced by the session id returned with each response.
///
/// # Examples
///
/// ```rust,no_run
/// # use claude_code_mcp::{Client, Config, ConversationRequest};
/// # #[tokio::main]
/// # async fn main() -> claude_code_mcp::Result<()> {
/// let client = Client::new(Config::default());
///
/// let first = client
///     .start_conversation(ConversationRequest::new("Remember the number 42"))
///     .await?;
///
/// let mut follow_up = ConversationRequest::new("What number did I give you?");
/// follow_up.continuation_id = first.session_id.clone();
/// let second = client.continue_conversation(follow_up).await?;
/// println!("{}", second.response);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<Config>,
    executor: Arc<dyn CommandExecutor>,
}

impl Client {
    /// Create a client that runs the CLI as a real child process
    pub fn new(config: Config) -> Self {
        let executor = Arc::new(ProcessExecutor::from_config(&config));
        Self {
            config: Arc::new(config),
            executor,
        }
    }

    /// Create a client with an explicit executor
    pub fn with_executor(config: Config, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            config: Arc::new(config),
            executor,
        }
    }

    /// Create a new client builder for fluent configuration
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start a brand-new conversation
    ///
    /// Never resumes an earlier conversation, even if the request carries a
    /// continuation id. A system prompt replaces the CLI's default one.
    pub async fn start_conversation(
        &self,
        request: ConversationRequest,
    ) -> Result<InterpretedResponse> {
        self.run(request, Mode::New).await
    }

    /// Continue an existing conversation
    ///
    /// With a continuation id the CLI resumes that conversation; without one
    /// it resumes whichever conversation it handled most recently. A system
    /// prompt is appended to the existing one. When the CLI output names no
    /// session, the request's continuation id is carried into the response.
    pub async fn continue_conversation(
        &self,
        request: ConversationRequest,
    ) -> Result<InterpretedResponse> {
        self.run(request, Mode::Continue).await
    }

    async fn run(&self, request: ConversationRequest, mode: Mode) -> Result<InterpretedResponse> {
        let command = build_command(&self.config, &request, mode)?;
        let options = ExecOptions::from_config(&self.config).with_cwd(request.cwd.clone());

        info!(
            %mode,
            resume = request.continuation_id.is_some(),
            model = request.model.as_deref().unwrap_or("default"),
            "Running Claude CLI"
        );

        let output = self.executor.execute(&command, &options).await.map_err(|e| {
            warn!(%mode, error = %e, "Claude CLI invocation failed");
            e
        })?;

        let fallback = match mode {
            Mode::New => None,
            Mode::Continue => request.continuation_id.as_deref(),
        };
        let response = interpret(&output.stdout, fallback);

        debug!(
            %mode,
            session_id = response.session_id.as_deref().unwrap_or("none"),
            is_error = response.is_error,
            response_len = response.response.len(),
            "Interpreted Claude CLI output"
        );

        Ok(response)
    }
}

/// Builder for creating `Client` instances with fluent configuration
///
/// # Examples
///
/// ```rust
/// # use claude_code_mcp::Client;
/// let client = Client::builder()
///     .binary("claude")
///     .timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(client.config().timeout_secs, 60);
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    config: Config,
    executor: Option<Arc<dyn CommandExecutor>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new client builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            executor: None,
        }
    }

    /// Set the configuration directly
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

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

    /// Replace the process executor, e.g. with a test double
    pub fn executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Build the final client instance
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn build(self) -> Result<Client> {
        self.config.validate()?;
        Ok(match self.executor {
            Some(executor) => Client::with_executor(self.config, executor),
            None => Client::new(self.config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::runtime::command::{
        APPEND_SYSTEM_PROMPT_FLAG, CONTINUE_FLAG, RESUME_FLAG, SYSTEM_PROMPT_FLAG,
    };
    use crate::testing::MockExecutor;
    use std::path::PathBuf;

    fn client(executor: &Arc<MockExecutor>) -> Client {
        Client::builder()
            .executor(executor.clone())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_conversation_end_to_end() {
        let executor = Arc::new(MockExecutor::replying(r#"{"result":"Hi!","session_id":"abc"}"#));
        let response = client(&executor)
            .start_conversation(ConversationRequest::new("Hello"))
            .await
            .unwrap();

        assert_eq!(response.response, "Hi!");
        assert_eq!(response.session_id.as_deref(), Some("abc"));
        assert!(!response.is_error);

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.render(), "claude -p 'Hello' --output-format json");
    }

    #[tokio::test]
    async fn test_continue_without_id_uses_latest() {
        let executor = Arc::new(MockExecutor::replying(r#"{"result":"Sure","session_id":"s2"}"#));
        client(&executor)
            .continue_conversation(ConversationRequest::new("Continue please"))
            .await
            .unwrap();

        let (command, _) = executor.last_call().unwrap();
        assert!(command.has_flag(CONTINUE_FLAG));
        assert!(!command.has_flag(RESUME_FLAG));
    }

    #[tokio::test]
    async fn test_continue_preserves_request_id_when_output_has_none() {
        let executor = Arc::new(MockExecutor::replying("plain text answer"));
        let response = client(&executor)
            .continue_conversation(ConversationRequest::new("Go on").with_continuation_id("prev-7"))
            .await
            .unwrap();

        assert_eq!(response.response, "plain text answer");
        assert_eq!(response.session_id.as_deref(), Some("prev-7"));

        let (command, _) = executor.last_call().unwrap();
        assert_eq!(command.flag_value(RESUME_FLAG), Some("prev-7"));
    }

    #[tokio::test]
    async fn test_start_does_not_inherit_request_id() {
        let executor = Arc::new(MockExecutor::replying(r#"{"result":"fresh"}"#));
        let response = client(&executor)
            .start_conversation(ConversationRequest::new("Hi").with_continuation_id("old"))
            .await
            .unwrap();

        assert_eq!(response.session_id, None);
    }

    #[tokio::test]
    async fn test_system_prompt_flag_depends_on_operation() {
        let executor = Arc::new(MockExecutor::replying(r#"{"result":"ok"}"#));
        let client = client(&executor);
        let request = ConversationRequest::new("Hi").with_system_prompt("Be terse");

        client.start_conversation(request.clone()).await.unwrap();
        let (start, _) = executor.last_call().unwrap();
        assert!(start.has_flag(SYSTEM_PROMPT_FLAG));

        client.continue_conversation(request).await.unwrap();
        let (resume, _) = executor.last_call().unwrap();
        assert!(resume.has_flag(APPEND_SYSTEM_PROMPT_FLAG));
    }

    #[tokio::test]
    async fn test_cwd_and_limits_reach_executor() {
        let executor = Arc::new(MockExecutor::replying(r#"{"result":"ok"}"#));
        let client = Client::builder()
            .timeout_secs(90)
            .max_output_bytes(2048)
            .executor(executor.clone())
            .build()
            .unwrap();

        client
            .start_conversation(ConversationRequest::new("ls").with_cwd("/srv/app"))
            .await
            .unwrap();

        let (_, options) = executor.last_call().unwrap();
        assert_eq!(options.cwd, Some(PathBuf::from("/srv/app")));
        assert_eq!(options.timeout.as_secs(), 90);
        assert_eq!(options.max_output_bytes, 2048);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_executor() {
        let executor = Arc::new(MockExecutor::replying("unused"));
        let err = client(&executor)
            .start_conversation(ConversationRequest::new(""))
            .await
            .unwrap_err();

        assert!(err.is_build_error());
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_execution_failure_propagates() {
        let executor = Arc::new(MockExecutor::failing(|| {
            Error::BinaryNotFound("claude".to_string())
        }));
        let err = client(&executor)
            .continue_conversation(ConversationRequest::new("Hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BinaryNotFound(_)));
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn test_builder_validates_config() {
        assert!(Client::builder().timeout_secs(0).build().is_err());
        assert!(Client::builder().binary("").build().is_err());
    }
}
