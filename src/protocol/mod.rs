//! JSON-RPC Protocol Types
//!
//! This module defines the JSON-RPC 2.0 envelope subset spoken with the MCP
//! server over stdio, plus the session codec that assigns request ids and
//! decodes captured responses.

pub mod codec;
pub mod envelope;

pub use codec::{parse_response, Session};
pub use envelope::{JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
