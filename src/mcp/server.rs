//! Request dispatch for the MCP server.
//!
//! [`McpServer`] maps JSON-RPC requests onto the conversation [`Client`]. It is
//! transport-agnostic: the stdio loop in [`crate::mcp::transport`] feeds it one
//! decoded line at a time and writes back whatever it returns.

use crate::core::{ConversationRequest, InterpretedResponse};
use crate::mcp::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, DEFAULT_PROTOCOL_VERSION, JSONRPC_VERSION,
};
use crate::mcp::tools::{tool_definitions, ContinueConversationArgs, StartConversationArgs, Tool};
use crate::runtime::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "claude-code-mcp";

/// Text block inside a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Result payload of `tools/call`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<TextContent>,
    pub is_error: bool,
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl CallToolResult {
    /// Successful turn. A CLI-reported `is_error` is passed through as
    /// ordinary text; only failures to run the turn set `isError`.
    pub fn from_response(response: InterpretedResponse) -> Self {
        let mut meta = Map::new();
        if let Some(session_id) = response.session_id {
            meta.insert("sessionId".to_string(), Value::String(session_id));
        }
        if let Some(metadata) = response.metadata {
            if let Ok(Value::Object(fields)) = serde_json::to_value(metadata) {
                meta.extend(fields);
            }
        }

        Self {
            content: vec![TextContent::new(response.response)],
            is_error: false,
            meta: (!meta.is_empty()).then_some(meta),
        }
    }

    /// Failed turn, reported in-band so the client can show it
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![TextContent::new(format!("Error: {}", message))],
            is_error: true,
            meta: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Dispatches MCP requests to the conversation client
#[derive(Debug, Clone)]
pub struct McpServer {
    client: Client,
}

impl McpServer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Handle one raw frame. Returns the response to write, if any.
    pub async fn handle_message(&self, frame: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(frame) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Discarding unparsable frame");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(e),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);

        if value.get("method").is_none() {
            // Responses to requests we never send are ignored.
            if value.get("result").is_some() || value.get("error").is_some() {
                debug!("Ignoring client response frame");
                return None;
            }
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("missing method"),
            ));
        }

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request(e))),
        }
    }

    /// Handle a decoded request. Notifications never produce a response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, id = ?request.id, "Dispatching request");

        if request.is_notification() {
            debug!(method = %request.method, "Received notification");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!(
                    "unsupported jsonrpc version '{}'",
                    request.jsonrpc
                )),
            ));
        }

        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match result {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        info!(protocol_version, "Client initialized");

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(JsonRpcError::invalid_params)?;

        let tool = Tool::from_name(&params.name).ok_or_else(|| {
            JsonRpcError::invalid_params(format!("unknown tool '{}'", params.name))
        })?;

        info!(tool = tool.name(), "Calling tool");

        let outcome = match tool {
            Tool::StartConversation => {
                let args: StartConversationArgs = serde_json::from_value(params.arguments)
                    .map_err(JsonRpcError::invalid_params)?;
                self.client
                    .start_conversation(ConversationRequest::from(args))
                    .await
            }
            Tool::ContinueConversation => {
                let args: ContinueConversationArgs = serde_json::from_value(params.arguments)
                    .map_err(JsonRpcError::invalid_params)?;
                self.client
                    .continue_conversation(ConversationRequest::from(args))
                    .await
            }
        };

        let result = match outcome {
            Ok(response) => CallToolResult::from_response(response),
            Err(e) => {
                warn!(tool = tool.name(), error = %e, "Tool call failed");
                CallToolResult::failure(e)
            }
        };

        serde_json::to_value(result).map_err(JsonRpcError::internal)
    }
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
