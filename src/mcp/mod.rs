//! Model Context Protocol surface: JSON-RPC types, tool declarations,
//! request dispatch and the stdio transport

pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{CallToolResult, McpServer, TextContent, SERVER_NAME};
pub use tools::{tool_definitions, Tool, ToolDefinition};
pub use transport::{serve, serve_stdio};
