//! JSON-RPC 2.0 envelopes written back to WebSocket clients.

use serde::Serialize;
use serde_json::Value;

/// The request could not be parsed as JSON.
pub const PARSE_ERROR: i32 = -32700;

/// The JSON is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;

/// The requested method does not exist or is unavailable.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// Error object inside an [`RpcErrorResponse`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RpcError {
    /// JSON-RPC error code.
    pub code: i32,
    /// Short description.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RpcErrorResponse {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Id of the failed request, `null` when it could not be read.
    pub id: Value,
    /// What went wrong.
    pub error: RpcError,
}

impl RpcErrorResponse {
    /// Builds an error response for request `id`.
    #[must_use]
    pub fn new(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error: RpcError {
                code,
                message: message.into(),
                data: None,
            },
        }
    }

    /// Response to text that is not JSON.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(Value::Null, PARSE_ERROR, "Parse error")
    }

    /// Serializes to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
