//! JSON-RPC Envelope Types
//!
//! Defines the JSON-RPC 2.0 subset exchanged with the MCP server.
//!
//! Protocol: Single JSON request on stdin → single JSON response on stdout.
//! The server process exits after answering one request.

use serde::{Deserialize, Serialize};

/// Protocol marker carried in every request
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request envelope
///
/// All server operations accept this envelope format on stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol marker, always "2.0"
    pub jsonrpc: String,

    /// Correlation id, assigned from the session counter
    /// MUST be unique per session (strictly increasing, no reuse)
    pub id: u64,

    /// Method to invoke (e.g. "initialize", "tools/list", "tools/call")
    pub method: String,

    /// Method parameters; an empty object when the method takes none
    #[serde(default)]
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    /// Create a request envelope with the given id
    pub fn new(id: u64, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response envelope
///
/// Exactly one of `result`/`error` is expected per the protocol, but the
/// harness passes through whatever the server emits rather than enforcing
/// exclusivity. Echoed `jsonrpc`/`id` are accepted and not required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Echoed protocol marker (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,

    /// Echoed correlation id (optional; servers may omit or alter it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    /// Success payload (present when the call succeeded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error payload (present when the server reports a failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Returns true when the server reported an error payload
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_wire_shape() {
        let req = JsonRpcRequest::new(7, "tools/list", json!({}));
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 7);
        assert_eq!(value["method"], "tools/list");
        assert!(value["params"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_response_result_parsing() {
        let json = r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[]}}"#;

        let resp: JsonRpcResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.is_error());
        assert_eq!(resp.result.unwrap()["tools"], json!([]));
    }

    #[test]
    fn test_response_error_parsing() {
        let json = r#"{"error":{"code":-32601,"message":"method not found"}}"#;

        let resp: JsonRpcResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_error());
        assert!(resp.result.is_none());
        assert_eq!(resp.error.unwrap()["message"], "method not found");
    }

    #[test]
    fn test_response_without_envelope_fields() {
        // Servers that omit jsonrpc/id entirely are still accepted.
        let resp: JsonRpcResponse = serde_json::from_str(r#"{"result":42}"#).unwrap();
        assert_eq!(resp.result, Some(json!(42)));
        assert!(resp.jsonrpc.is_none());
        assert!(resp.id.is_none());
    }
}
