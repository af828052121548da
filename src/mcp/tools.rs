//! Tool declarations and argument types for the two conversation tools.

use crate::core::ConversationRequest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;

pub const START_CONVERSATION: &str = "start_conversation";
pub const CONTINUE_CONVERSATION: &str = "continue_conversation";

/// The tools this server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    StartConversation,
    ContinueConversation,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::StartConversation, Tool::ContinueConversation];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            START_CONVERSATION => Some(Tool::StartConversation),
            CONTINUE_CONVERSATION => Some(Tool::ContinueConversation),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::StartConversation => START_CONVERSATION,
            Tool::ContinueConversation => CONTINUE_CONVERSATION,
        }
    }

    /// Tool declaration as listed by `tools/list`
    pub fn definition(&self) -> ToolDefinition {
        match self {
            Tool::StartConversation => ToolDefinition {
                name: START_CONVERSATION.to_string(),
                description: "Start a new Claude Code conversation. Returns the response text \
                              and a sessionId that continue_conversation accepts as continuationId."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "prompt": prompt_property(),
                        "model": model_property(),
                        "systemPrompt": {
                            "type": "string",
                            "description": "System prompt replacing Claude Code's default"
                        },
                        "cwd": cwd_property()
                    },
                    "required": ["prompt"]
                }),
            },
            Tool::ContinueConversation => ToolDefinition {
                name: CONTINUE_CONVERSATION.to_string(),
                description: "Continue a Claude Code conversation. Resumes the conversation named \
                              by continuationId, or the most recent one when it is omitted."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "prompt": prompt_property(),
                        "continuationId": {
                            "type": "string",
                            "description": "sessionId returned by an earlier call"
                        },
                        "model": model_property(),
                        "systemPrompt": {
                            "type": "string",
                            "description": "Additional guidance appended to the existing system prompt"
                        },
                        "cwd": cwd_property()
                    },
                    "required": ["prompt"]
                }),
            },
        }
    }
}

fn prompt_property() -> Value {
    json!({
        "type": "string",
        "description": "Message to send to Claude Code",
        "minLength": 1
    })
}

fn model_property() -> Value {
    json!({
        "type": "string",
        "description": "Model alias or full name, e.g. 'sonnet' or 'opus'"
    })
}

fn cwd_property() -> Value {
    json!({
        "type": "string",
        "description": "Working directory for Claude Code; defaults to the server's own"
    })
}

/// A tool as described to MCP clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Arguments of `start_conversation`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationArgs {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl From<StartConversationArgs> for ConversationRequest {
    fn from(args: StartConversationArgs) -> Self {
        ConversationRequest {
            prompt: args.prompt,
            model: args.model,
            system_prompt: args.system_prompt,
            cwd: args.cwd,
            continuation_id: None,
        }
    }
}

/// Arguments of `continue_conversation`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueConversationArgs {
    pub prompt: String,
    #[serde(default)]
    pub continuation_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl From<ContinueConversationArgs> for ConversationRequest {
    fn from(args: ContinueConversationArgs) -> Self {
        ConversationRequest {
            prompt: args.prompt,
            model: args.model,
            system_prompt: args.system_prompt,
            cwd: args.cwd,
            continuation_id: args.continuation_id,
        }
    }
}

/// Declarations for every exposed tool
pub fn tool_definitions() -> Vec<ToolDefinition> {
    Tool::ALL.iter().map(Tool::definition).collect()
}
