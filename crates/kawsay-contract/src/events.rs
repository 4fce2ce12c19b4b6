// crates/kawsay-contract/src/events.rs
// ============================================================================
// Module: Harness Event Log
// Description: Structured JSON-line events for exchanges and scenario results.
// Purpose: Emit machine-readable harness logs without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every HTTP exchange, scenario verdict, and best-effort transport notice is
//! recorded as a JSON line through an [`EventSink`]. Sinks are deliberately
//! infallible: serialization or write failures are dropped so that logging can
//! never change a scenario verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::EventLogTarget;

// ============================================================================
// SECTION: Types
// ============================================================================

/// HTTP exchange event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// HTTP method.
    pub method: String,
    /// Request path relative to the base URL.
    pub path: String,
    /// Response status when a response arrived.
    pub status: Option<u16>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock duration of the exchange.
    pub elapsed_ms: u64,
    /// Transport error kind when the exchange failed.
    pub error_kind: Option<&'static str>,
}

/// Scenario verdict event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Suite label.
    pub suite: String,
    /// Scenario name.
    pub scenario: String,
    /// Expected status code.
    pub expected_status: u16,
    /// Observed status code when a response arrived.
    pub actual_status: Option<u16>,
    /// `pass` or `fail`.
    pub verdict: &'static str,
    /// Failure classification when the scenario failed.
    pub failure_kind: Option<&'static str>,
    /// Failure message when the scenario failed.
    pub message: Option<String>,
}

/// Best-effort transport condition that is logged, not escalated.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Notice kind label.
    pub kind: &'static str,
    /// Request path the notice relates to.
    pub path: String,
    /// Detail message.
    pub message: String,
}

/// Inputs required to construct an exchange event.
pub struct ExchangeEventParams {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status when available.
    pub status: Option<u16>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Exchange duration in milliseconds.
    pub elapsed_ms: u64,
    /// Transport error kind when the exchange failed.
    pub error_kind: Option<&'static str>,
}

/// Inputs required to construct a scenario event.
pub struct ScenarioEventParams {
    /// Suite label.
    pub suite: String,
    /// Scenario name.
    pub scenario: String,
    /// Expected status code.
    pub expected_status: u16,
    /// Observed status code.
    pub actual_status: Option<u16>,
    /// Whether the scenario passed.
    pub passed: bool,
    /// Failure classification.
    pub failure_kind: Option<&'static str>,
    /// Failure message.
    pub message: Option<String>,
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Returns the current timestamp in milliseconds since the epoch.
#[must_use]
pub fn unix_millis() -> u64 {
    duration_millis(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
}

impl ExchangeEvent {
    /// Creates a new exchange event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ExchangeEventParams) -> Self {
        Self {
            event: "http_exchange",
            timestamp_ms: unix_millis(),
            method: params.method,
            path: params.path,
            status: params.status,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
            elapsed_ms: params.elapsed_ms,
            error_kind: params.error_kind,
        }
    }
}

impl ScenarioEvent {
    /// Creates a new scenario event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ScenarioEventParams) -> Self {
        Self {
            event: "scenario_result",
            timestamp_ms: unix_millis(),
            suite: params.suite,
            scenario: params.scenario,
            expected_status: params.expected_status,
            actual_status: params.actual_status,
            verdict: if params.passed { "pass" } else { "fail" },
            failure_kind: params.failure_kind,
            message: params.message,
        }
    }
}

impl NoticeEvent {
    /// Creates a new notice event with a consistent timestamp.
    #[must_use]
    pub fn new(kind: &'static str, path: &str, message: String) -> Self {
        Self {
            event: "transport_notice",
            timestamp_ms: unix_millis(),
            kind,
            path: path.to_string(),
            message,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for structured harness events.
pub trait EventSink: Send + Sync {
    /// Records an HTTP exchange.
    fn record_exchange(&self, event: &ExchangeEvent);

    /// Records a scenario verdict.
    fn record_scenario(&self, _event: &ScenarioEvent) {}

    /// Records a best-effort transport notice.
    fn record_notice(&self, _event: &NoticeEvent) {}
}

/// Sink that discards all events.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record_exchange(&self, _event: &ExchangeEvent) {}
}

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl StderrEventSink {
    /// Writes one serialized event line to stderr.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

impl EventSink for StderrEventSink {
    fn record_exchange(&self, event: &ExchangeEvent) {
        Self::emit(event);
    }

    fn record_scenario(&self, event: &ScenarioEvent) {
        Self::emit(event);
    }

    fn record_notice(&self, event: &NoticeEvent) {
        Self::emit(event);
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event line.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl EventSink for FileEventSink {
    fn record_exchange(&self, event: &ExchangeEvent) {
        self.emit(event);
    }

    fn record_scenario(&self, event: &ScenarioEvent) {
        self.emit(event);
    }

    fn record_notice(&self, event: &NoticeEvent) {
        self.emit(event);
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds a sink for the configured target.
///
/// # Errors
///
/// Returns an error when a file target cannot be opened.
pub fn sink_for_target(target: &EventLogTarget) -> io::Result<Arc<dyn EventSink>> {
    Ok(match target {
        EventLogTarget::Off => Arc::new(NoopEventSink),
        EventLogTarget::Stderr => Arc::new(StderrEventSink),
        EventLogTarget::File(path) => Arc::new(FileEventSink::new(path)?),
    })
}
