//! Harness Client
//!
//! Thin convenience layer over the transport: builds request envelopes via
//! the session codec and frames tool calls as `tools/call` method requests.
//! Carries no state of its own beyond the session id counter.

use std::sync::Arc;

use serde_json::json;

use crate::protocol::codec::Session;
use crate::protocol::envelope::JsonRpcResponse;
use crate::scenario::Invocation;
use crate::transport::{Transport, TransportError};

/// Client for one harness session
pub struct HarnessClient {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl HarnessClient {
    /// Create a client over the given transport with a fresh session
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: Session::new(),
        }
    }

    /// Send a raw JSON-RPC method call
    ///
    /// `params` defaults to an empty object.
    pub fn send(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<JsonRpcResponse, TransportError> {
        let request = self.session.build_request(method, params);
        self.transport.exchange(&request)
    }

    /// Call a named tool via `tools/call`
    ///
    /// Wraps `arguments` (default empty object) and `name` into the
    /// `{name, arguments}` params shape the server expects.
    pub fn call_tool(
        &mut self,
        name: &str,
        arguments: Option<serde_json::Value>,
    ) -> Result<JsonRpcResponse, TransportError> {
        let params = json!({
            "name": name,
            "arguments": arguments.unwrap_or_else(|| json!({})),
        });
        self.send("tools/call", Some(params))
    }

    /// Dispatch a bound scenario invocation
    pub fn dispatch(&mut self, invocation: &Invocation) -> Result<JsonRpcResponse, TransportError> {
        match invocation {
            Invocation::Raw { method, params } => self.send(method, params.clone()),
            Invocation::Tool { name, arguments } => self.call_tool(name, arguments.clone()),
        }
    }
}
