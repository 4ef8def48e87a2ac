//! Transport Layer
//!
//! Abstracts the request/response exchange for testability. Provides:
//! - Transport trait: interface for one exchange
//! - ProcessTransport: real spawn-per-request server process
//! - ScriptedTransport: in-process stand-in for unit tests
//!
//! Format: Single JSON request on stdin → single JSON response on stdout.
//! Every exchange is a fully independent process lifecycle; there is no
//! persistent server connection, so state only carries between exchanges
//! through the on-disk registry/database files.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::ServerTarget;
use crate::protocol::codec;
use crate::protocol::envelope::{JsonRpcRequest, JsonRpcResponse};

/// How often the child is polled for exit while the timeout runs
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Transport trait for one request/response exchange
pub trait Transport: Send + Sync {
    /// Execute one exchange and return the parsed response
    fn exchange(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;
}

/// Transport errors
///
/// The `Result` shape guarantees a failure is never coerced into a
/// success-shaped value.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server exceeded the allotted wait; no partial output is consumed
    #[error("server request timed out")]
    Timeout,

    /// The server could not be launched, piped to, or produced no output
    #[error("failed to communicate with server: {0}")]
    Failed(String),

    /// Output was received but is not decodable as the wire format
    #[error("{message}")]
    Protocol {
        message: String,
        /// Captured stdout, retained verbatim
        raw_output: String,
    },
}

/// Spawn-per-request process transport
///
/// Launches `<server> --registry <registry> --db <db>` for every exchange,
/// writes the encoded request to its stdin, and collects stdout/stderr until
/// the process exits or the timeout fires. The child handle and its pipes
/// are released on every exit path, including timeout.
pub struct ProcessTransport {
    target: ServerTarget,
    timeout: Duration,
}

impl ProcessTransport {
    /// Create a process transport for the given target and per-exchange timeout
    pub fn new(target: ServerTarget, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    /// The target this transport spawns
    pub fn target(&self) -> &ServerTarget {
        &self.target
    }
}

impl Transport for ProcessTransport {
    fn exchange(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let request_json = serde_json::to_string(request)
            .map_err(|e| TransportError::Failed(format!("failed to encode request: {}", e)))?;

        let mut child = Command::new(&self.target.server_path)
            .arg("--registry")
            .arg(&self.target.registry_path)
            .arg("--db")
            .arg(&self.target.db_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TransportError::Failed(format!("failed to launch server: {}", e)))?;

        // Feed the request, then drop the handle so the server sees EOF.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = writeln!(stdin, "{}", request_json) {
                reap(&mut child);
                return Err(TransportError::Failed(format!(
                    "failed to write request: {}",
                    e
                )));
            }
        }

        // Drain both pipes off-thread; reading inline could deadlock once a
        // pipe buffer fills.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_status)) => break,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        reap(&mut child);
                        let _ = stdout_reader.join();
                        let _ = stderr_reader.join();
                        return Err(TransportError::Timeout);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    reap(&mut child);
                    let _ = stdout_reader.join();
                    let _ = stderr_reader.join();
                    return Err(TransportError::Failed(format!(
                        "failed waiting for server: {}",
                        e
                    )));
                }
            }
        }

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        // Diagnostics on stderr are a warning side channel, not a failure.
        if !stderr.trim().is_empty() {
            eprintln!("Warning: server stderr: {}", stderr.trim_end());
        }

        if stdout.trim().is_empty() {
            return Err(TransportError::Failed("no response from server".to_string()));
        }

        codec::parse_response(&stdout)
    }
}

/// Kill and wait the child so no zombie is left behind
fn reap(child: &mut std::process::Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Drain a child pipe to completion on its own thread
fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = source {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Scripted transport for testing
///
/// Answers each exchange from a queued list of outcomes and records the
/// method of every request dispatched through it. When the queue runs dry
/// it answers with an empty success result.
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<JsonRpcResponse, TransportError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Create a scripted transport with an empty queue
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response wrapping the given result payload
    pub fn push_result(&self, result: serde_json::Value) {
        self.push_outcome(Ok(success_response(result)));
    }

    /// Queue an arbitrary exchange outcome
    pub fn push_outcome(&self, outcome: Result<JsonRpcResponse, TransportError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Methods of every request seen so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ScriptedTransport {
    fn exchange(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        self.calls.lock().unwrap().push(request.method.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(success_response(serde_json::json!({}))))
    }
}

fn success_response(result: serde_json::Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: Some(crate::protocol::envelope::JSONRPC_VERSION.to_string()),
        id: None,
        result: Some(result),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_request(method: &str) -> JsonRpcRequest {
        JsonRpcRequest::new(1, method, json!({}))
    }

    #[test]
    fn test_scripted_transport_answers_in_order() {
        let transport = ScriptedTransport::new();
        transport.push_result(json!({"first": true}));
        transport.push_result(json!({"second": true}));

        let a = transport.exchange(&make_request("initialize")).unwrap();
        let b = transport.exchange(&make_request("tools/list")).unwrap();

        assert_eq!(a.result.unwrap()["first"], true);
        assert_eq!(b.result.unwrap()["second"], true);
        assert_eq!(transport.calls(), vec!["initialize", "tools/list"]);
    }

    #[test]
    fn test_scripted_transport_default_success_when_dry() {
        let transport = ScriptedTransport::new();

        let resp = transport.exchange(&make_request("resources/list")).unwrap();
        assert_eq!(resp.result, Some(json!({})));
    }

    #[test]
    fn test_scripted_transport_replays_failures() {
        let transport = ScriptedTransport::new();
        transport.push_outcome(Err(TransportError::Timeout));

        let result = transport.exchange(&make_request("tools/call"));
        assert!(matches!(result, Err(TransportError::Timeout)));
    }
}
