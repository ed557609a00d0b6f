//! JSON-RPC 2.0 framing for the WebSocket transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Standard JSON-RPC 2.0 error codes.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

// Application error codes (server-defined range).
pub const AUTH_ERROR: i64 = -32000;
pub const QUOTA_EXCEEDED: i64 = -32001;
pub const AUDIO_REJECTED: i64 = -32002;
pub const PROVIDER_FAILURE: i64 = -32003;

/// An incoming JSON-RPC request frame.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications; echoed back otherwise.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// An outgoing JSON-RPC response frame.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

impl RpcResponse {
    /// A success response carrying `result`.
    pub fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id: id.unwrap_or(Value::Null),
        }
    }

    /// An error response.
    pub fn fail(id: Option<Value>, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(error),
            id: id.unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_parses_with_and_without_id() {
        let with_id: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"method":"get_base_prompts"}"#)
                .expect("parse");
        assert_eq!(with_id.id, Some(json!(7)));
        assert_eq!(with_id.method, "get_base_prompts");
        assert!(with_id.params.is_null());

        let notification: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"ping"}"#).expect("parse");
        assert!(notification.id.is_none());
    }

    #[test]
    fn success_response_has_no_error_field() {
        let response = RpcResponse::ok(Some(json!(1)), json!({"ok": true}));
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 1);
        assert!(value.get("error").is_none());
        assert_eq!(value["result"]["ok"], true);
    }

    #[test]
    fn error_response_echoes_null_id_when_unknown() {
        let response = RpcResponse::fail(None, RpcError::new(PARSE_ERROR, "bad json"));
        let value = serde_json::to_value(&response).expect("serialize");
        assert!(value["id"].is_null());
        assert_eq!(value["error"]["code"], PARSE_ERROR);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn error_data_is_optional() {
        let bare = serde_json::to_value(RpcError::new(AUTH_ERROR, "no")).expect("serialize");
        assert!(bare.get("data").is_none());

        let with_data = serde_json::to_value(
            RpcError::new(QUOTA_EXCEEDED, "full").with_data(json!({"resets_at": "soon"})),
        )
        .expect("serialize");
        assert_eq!(with_data["data"]["resets_at"], "soon");
    }
}
