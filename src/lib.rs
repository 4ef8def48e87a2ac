//! mcp-harness - Interactive stdio test harness for an MCP database server
//!
//! This crate builds JSON-RPC 2.0 requests, hands each one to a freshly
//! spawned server process, parses the single response, and steps an operator
//! through a fixed battery of scenarios with pause/skip/quit control between
//! steps.

pub mod client;
pub mod config;
pub mod driver;
pub mod protocol;
pub mod scenario;
pub mod transport;

pub use client::HarnessClient;
pub use config::{HarnessConfig, ServerTarget};
pub use driver::{Driver, RunOutcome, SessionReport};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, Session};
pub use scenario::{standard_scenarios, Invocation, Scenario};
pub use transport::{ProcessTransport, ScriptedTransport, Transport, TransportError};
