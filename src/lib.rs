//! # claude-code-mcp
//!
//! An MCP server that exposes Claude Code conversations as two tools,
//! `start_conversation` and `continue_conversation`, by running the `claude`
//! CLI as a subprocess for every turn.
//!
//! The library is usable on its own:
//!
//! ```rust,no_run
//! use claude_code_mcp::{Client, Config, ConversationRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> claude_code_mcp::Result<()> {
//! let client = Client::new(Config::default());
//! let reply = client
//!     .start_conversation(ConversationRequest::new("Explain this repository").with_cwd("."))
//!     .await?;
//!
//! println!("{}", reply.response);
//! if let Some(session) = reply.session_id {
//!     println!("continue with session {}", session);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: request/response types, configuration, validation and errors
//! - [`runtime`]: command line construction, the process executor and the
//!   response interpreter
//! - [`mcp`]: JSON-RPC dispatch and the stdio transport
//! - `cli` (feature `cli`): argument parsing and layered settings for the binary

pub mod core;
pub mod mcp;
pub mod runtime;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::core::{
    Config, ConfigBuilder, ConversationRequest, Error, ExecutionOutput, InterpretedResponse,
    Mode, ResponseMetadata, Result, SessionId,
};
pub use crate::mcp::McpServer;
pub use crate::runtime::{
    build_command, interpret, Client, ClientBuilder, CommandExecutor, CommandLine, ExecOptions,
    ProcessExecutor,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
