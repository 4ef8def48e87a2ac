//! Session Codec
//!
//! Builds request envelopes with session-scoped ids and decodes captured
//! server output into response envelopes.

use serde_json::json;

use crate::protocol::envelope::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::TransportError;

/// Per-session request id state
///
/// The only cross-call mutable state in the harness. It is owned by the
/// client rather than living in a process-wide global, so independent
/// sessions can run in the same process without interference.
#[derive(Debug)]
pub struct Session {
    next_id: u64,
}

impl Session {
    /// Create a fresh session; ids start at 1
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Build a request envelope, assigning the next session id
    ///
    /// `params` defaults to an empty object. The id counter advances exactly
    /// once per call, regardless of what happens to the request afterwards.
    pub fn build_request(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> JsonRpcRequest {
        let id = self.next_id;
        self.next_id += 1;
        JsonRpcRequest::new(id, method, params.unwrap_or_else(|| json!({})))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode captured server stdout into a response envelope
///
/// On decode failure the raw output is retained verbatim; it is the primary
/// debugging signal for a malformed server.
pub fn parse_response(raw: &str) -> Result<JsonRpcResponse, TransportError> {
    serde_json::from_str(raw.trim()).map_err(|e| TransportError::Protocol {
        message: format!("invalid JSON response: {}", e),
        raw_output: raw.to_string(),
    })
}
