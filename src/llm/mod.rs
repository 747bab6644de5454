//! Language-model chat seam.
//!
//! The assistant only needs one capability from a model: complete a chat
//! transcript, optionally offering tool declarations, and report either a
//! text reply or a request to call tools. [`ChatService`] captures that;
//! [`AzureChatClient`] implements it against an OpenAI-compatible
//! chat-completions endpoint.

mod azure;

pub use azure::{AzureChatClient, ChatConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Chat service errors. All of them are transport-class for the assistant.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat service is not configured (set AZURE_OPENAI_ENDPOINT)")]
    NotConfigured,

    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat service error: {0}")]
    Service(String),

    #[error("malformed chat response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One transcript entry, in the chat-completions wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: vec![],
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// The assistant turn that requested tool calls. It must precede the
    /// matching `tool` messages in the transcript.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: vec![],
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A model's request to invoke one named tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

fn function_kind() -> String {
    "function".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as produced by the model.
    pub arguments: String,
}

/// A callable tool offered to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's argument object.
    pub parameters: Value,
}

impl ToolDeclaration {
    /// The `{"type": "function", "function": {...}}` wire form.
    pub fn to_wire(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// What a single chat completion produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    Text(String),
    ToolCalls {
        content: Option<String>,
        calls: Vec<ToolCall>,
    },
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Complete `messages`. When `tools` is `Some`, the model may answer with
    /// tool calls (`tool_choice = auto`).
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDeclaration]>,
    ) -> Result<ChatReply, ChatError>;
}
