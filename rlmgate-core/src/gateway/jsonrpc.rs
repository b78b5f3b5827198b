//! JSON-RPC 2.0 envelope types for the gateway's tool-call surface.
//!
//! Tool results arrive double-encoded: the JSON-RPC `result.content[0].text`
//! field holds a JSON *string* whose decoded value is the actual payload.
//! [`JsonRpcResponse::tool_text`] unwraps the outer layer; the caller decodes
//! the inner one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Outbound JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: i64,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    /// Build a `tools/call` request for the named tool.
    #[must_use]
    pub fn tool_call(tool: &str, arguments: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: 1,
            method: "tools/call".to_string(),
            params: serde_json::json!({
                "name": tool,
                "arguments": arguments,
            }),
        }
    }
}

/// Inbound JSON-RPC response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<ToolCallResult>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    /// Text of the first content item, when the call succeeded.
    #[must_use]
    pub fn tool_text(&self) -> Option<&str> {
        self.result
            .as_ref()?
            .content
            .first()
            .map(|item| item.text.as_str())
    }
}

/// `result` payload of a `tools/call` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// One entry of a tool result's content list.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    #[serde(default)]
    pub text: String,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
}
