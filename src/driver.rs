//! Interactive Driver
//!
//! Walks the scenario list strictly in order, renders each exchange outcome,
//! and asks the operator whether to continue after every step except the
//! last. One scenario's failure never aborts the run; only the operator (or
//! the end of the list) ends it.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::HarnessClient;
use crate::protocol::envelope::JsonRpcResponse;
use crate::scenario::Scenario;
use crate::transport::TransportError;

/// Terminal state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every scenario executed
    Done,
    /// Operator chose 'q'; remaining scenarios were not executed
    Quit,
    /// Operator chose 's'; remaining scenario names were reported, then halt
    Skipped,
}

/// How a single executed step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Server answered with a result payload
    Ok,
    /// Server answered with an error payload
    ServerError,
    /// Output received but not decodable as the wire format
    ProtocolError,
    /// The exchange timed out
    Timeout,
    /// The server could not be launched, piped to, or produced no output
    TransportFailed,
}

impl StepStatus {
    /// Whether this step counts as a success in the summary
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Ok)
    }
}

/// Record of one executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Scenario name
    pub name: String,
    /// How the step ended
    pub status: StepStatus,
    /// Wall-clock duration of the exchange in milliseconds
    pub duration_ms: u64,
}

/// Closing summary for one interactive session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// When the session started
    pub created_at: DateTime<Utc>,
    /// Terminal state the session reached
    pub outcome: RunOutcome,
    /// Number of scenarios executed
    pub executed: usize,
    /// Number of executed scenarios that succeeded
    pub succeeded: usize,
    /// Number of executed scenarios that failed (any non-success status)
    pub failed: usize,
    /// Per-step records, in execution order
    pub steps: Vec<StepRecord>,
    /// Names of scenarios left unexecuted, in declaration order
    pub skipped: Vec<String>,
}

impl SessionReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            outcome: RunOutcome::Done,
            executed: 0,
            succeeded: 0,
            failed: 0,
            steps: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Record one executed step
    pub fn add_step(&mut self, step: StepRecord) {
        self.executed += 1;
        if step.status.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.steps.push(step);
    }

    /// Convert to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for SessionReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Operator decision after a non-final step
enum Choice {
    Continue,
    Quit,
    Skip,
}

/// Interactive scenario driver
///
/// Generic over the operator input and the render sink so the control loop
/// can be exercised with scripted input in tests.
pub struct Driver<R, W> {
    client: HarnessClient,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Driver<R, W> {
    /// Create a driver over a client, operator input, and output sink
    pub fn new(client: HarnessClient, input: R, out: W) -> Self {
        Self { client, input, out }
    }

    /// Run the battery to a terminal state and return the session report
    ///
    /// The last scenario never prompts; a single-scenario (or empty) list
    /// therefore terminates in `Done` without any operator decision.
    pub fn run(&mut self, scenarios: &[Scenario]) -> io::Result<SessionReport> {
        let mut report = SessionReport::new();

        for (index, scenario) in scenarios.iter().enumerate() {
            let start = Instant::now();
            let outcome = self.client.dispatch(&scenario.invocation);
            let status = self.render(&scenario.name, &outcome)?;

            report.add_step(StepRecord {
                name: scenario.name.clone(),
                status,
                duration_ms: start.elapsed().as_millis() as u64,
            });

            if index + 1 == scenarios.len() {
                break;
            }

            match self.prompt()? {
                Choice::Continue => {}
                Choice::Quit => {
                    report.outcome = RunOutcome::Quit;
                    break;
                }
                Choice::Skip => {
                    let remaining: Vec<String> = scenarios[index + 1..]
                        .iter()
                        .map(|s| s.name.clone())
                        .collect();
                    writeln!(
                        self.out,
                        "Skipping remaining scenarios: {}",
                        remaining.join(", ")
                    )?;
                    report.skipped = remaining;
                    report.outcome = RunOutcome::Skipped;
                    break;
                }
            }
        }

        self.print_summary(&report)?;
        Ok(report)
    }

    /// Render one exchange outcome and classify it
    fn render(
        &mut self,
        name: &str,
        outcome: &Result<JsonRpcResponse, TransportError>,
    ) -> io::Result<StepStatus> {
        writeln!(self.out)?;
        writeln!(self.out, "=== {} ===", name)?;

        let status = match outcome {
            Ok(response) if response.is_error() => {
                let error = response.error.as_ref().unwrap_or(&Value::Null);
                writeln!(self.out, "✗ server error: {}", pretty(error))?;
                StepStatus::ServerError
            }
            Ok(response) => {
                writeln!(self.out, "✓ success:")?;
                match serde_json::to_value(response) {
                    Ok(value) => writeln!(self.out, "{}", pretty(&value))?,
                    Err(_) => writeln!(self.out, "<unrenderable response>")?,
                }
                StepStatus::Ok
            }
            Err(TransportError::Timeout) => {
                writeln!(self.out, "✗ server request timed out")?;
                StepStatus::Timeout
            }
            Err(TransportError::Failed(message)) => {
                writeln!(self.out, "✗ transport failure: {}", message)?;
                StepStatus::TransportFailed
            }
            Err(TransportError::Protocol {
                message,
                raw_output,
            }) => {
                writeln!(self.out, "✗ protocol error: {}", message)?;
                writeln!(self.out, "Raw output: {}", raw_output)?;
                StepStatus::ProtocolError
            }
        };

        Ok(status)
    }

    /// Ask the operator what to do next
    ///
    /// EOF on the input is treated as a quit so a closed stdin cannot hang
    /// the session.
    fn prompt(&mut self) -> io::Result<Choice> {
        writeln!(self.out)?;
        write!(
            self.out,
            "Press Enter to continue, 'q' to quit, 's' to skip remaining: "
        )?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Choice::Quit);
        }

        match line.trim().to_lowercase().as_str() {
            "q" => Ok(Choice::Quit),
            "s" => Ok(Choice::Skip),
            _ => Ok(Choice::Continue),
        }
    }

    /// Print the closing summary for any terminal state
    fn print_summary(&mut self, report: &SessionReport) -> io::Result<()> {
        let outcome = match report.outcome {
            RunOutcome::Done => "completed",
            RunOutcome::Quit => "quit by operator",
            RunOutcome::Skipped => "skipped remaining",
        };

        writeln!(self.out)?;
        writeln!(self.out, "=== Session Summary ===")?;
        writeln!(self.out, "Outcome: {}", outcome)?;
        writeln!(
            self.out,
            "Scenarios: {} executed, {} succeeded, {} failed",
            report.executed, report.succeeded, report.failed
        )?;
        if !report.skipped.is_empty() {
            writeln!(self.out, "Skipped: {}", report.skipped.join(", "))?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "Interactive testing completed.")?;
        Ok(())
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use crate::transport::ScriptedTransport;
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Arc;

    fn scenario(name: &str, method: &str) -> Scenario {
        Scenario::raw(name, method, None)
    }

    fn run_driver(
        transport: Arc<ScriptedTransport>,
        scenarios: &[Scenario],
        operator_input: &str,
    ) -> (SessionReport, String) {
        let client = HarnessClient::new(transport);
        let mut out = Vec::new();
        let report = {
            let mut driver = Driver::new(client, Cursor::new(operator_input.to_string()), &mut out);
            driver.run(scenarios).unwrap()
        };
        (report, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_report_aggregation() {
        let mut report = SessionReport::new();

        report.add_step(StepRecord {
            name: "A".to_string(),
            status: StepStatus::Ok,
            duration_ms: 10,
        });
        report.add_step(StepRecord {
            name: "B".to_string(),
            status: StepStatus::Timeout,
            duration_ms: 25,
        });

        assert_eq!(report.executed, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_report_json_output() {
        let mut report = SessionReport::new();
        report.add_step(StepRecord {
            name: "A".to_string(),
            status: StepStatus::ServerError,
            duration_ms: 5,
        });

        let json: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["executed"], 1);
        assert_eq!(json["steps"][0]["status"], "server_error");
    }

    #[test]
    fn test_single_scenario_never_prompts() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_result(json!({"ok": true}));

        // Empty operator input: a prompt would read EOF and quit, so a Done
        // outcome proves no prompt happened.
        let (report, output) = run_driver(transport, &[scenario("Only", "tools/list")], "");

        assert_eq!(report.outcome, RunOutcome::Done);
        assert_eq!(report.executed, 1);
        assert!(!output.contains("Press Enter"));
    }

    #[test]
    fn test_server_error_is_rendered_and_run_continues() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_outcome(Ok(JsonRpcResponse {
            jsonrpc: None,
            id: None,
            result: None,
            error: Some(json!({"message": "no such table"})),
        }));
        transport.push_result(json!({"ok": true}));

        let scenarios = [scenario("A", "tools/call"), scenario("B", "tools/list")];
        let (report, output) = run_driver(transport, &scenarios, "\n");

        assert_eq!(report.outcome, RunOutcome::Done);
        assert_eq!(report.steps[0].status, StepStatus::ServerError);
        assert_eq!(report.steps[1].status, StepStatus::Ok);
        assert!(output.contains("no such table"));
    }

    #[test]
    fn test_protocol_error_renders_raw_output() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_outcome(Err(TransportError::Protocol {
            message: "invalid JSON response".to_string(),
            raw_output: "<<<garbage>>>".to_string(),
        }));

        let (report, output) = run_driver(transport, &[scenario("Only", "tools/list")], "");

        assert_eq!(report.steps[0].status, StepStatus::ProtocolError);
        assert!(output.contains("<<<garbage>>>"));
    }

    #[test]
    fn test_failure_does_not_abort_run() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_outcome(Err(TransportError::Timeout));
        transport.push_result(json!({"ok": true}));

        let scenarios = [scenario("A", "initialize"), scenario("B", "tools/list")];
        let (report, _) = run_driver(transport.clone(), &scenarios, "\n");

        assert_eq!(report.outcome, RunOutcome::Done);
        assert_eq!(report.executed, 2);
        assert_eq!(transport.calls(), vec!["initialize", "tools/list"]);
    }
}
