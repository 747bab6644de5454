use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request envelope for the persistence RPC endpoint (`POST /mcp`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub method: String,
    #[serde(default = "empty_params")]
    pub params: Value,
}

fn empty_params() -> Value {
    Value::Object(Default::default())
}

/// Response envelope for the persistence RPC endpoint.
///
/// Exactly one of `result` and `error` is set by the server. Business failures
/// such as an unknown id travel in `error`; they are not HTTP errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct McpResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl McpResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}
