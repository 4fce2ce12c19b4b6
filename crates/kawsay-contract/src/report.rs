// crates/kawsay-contract/src/report.rs
// ============================================================================
// Module: Suite Reports
// Description: Per-scenario outcomes and aggregated suite reports.
// Purpose: Summarize verdicts for humans and persist deterministic artifacts.
// Dependencies: serde, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! A [`SuiteReport`] lists one [`ScenarioOutcome`] per scenario in table
//! order. Reports render as plain text or markdown and can be written to a
//! directory as canonical JSON (JCS) plus a markdown summary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name of the canonical JSON report artifact.
pub const REPORT_JSON_FILE: &str = "report.json";
/// File name of the markdown report artifact.
pub const REPORT_MARKDOWN_FILE: &str = "report.md";

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Failure details for a scenario that did not pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioFailure {
    /// `transport` or `contract`.
    pub category: &'static str,
    /// Detailed failure kind (for example `status` or `connect`).
    pub kind: &'static str,
    /// Human-readable failure message.
    pub message: String,
}

/// Verdict for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// Expected status code.
    pub expected_status: u16,
    /// Observed status code; `None` when no response arrived.
    pub actual_status: Option<u16>,
    /// Wall-clock scenario duration.
    pub elapsed_ms: u64,
    /// Failure details; `None` when the scenario passed.
    pub failure: Option<ScenarioFailure>,
}

impl ScenarioOutcome {
    /// Returns true when the scenario passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

// ============================================================================
// SECTION: Suite Report
// ============================================================================

/// Aggregated verdicts for a suite run.
///
/// # Invariants
/// - `total == passed + failed == outcomes.len()`.
/// - `outcomes` follows scenario table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Suite label.
    pub suite: String,
    /// Predictor base URL the suite ran against.
    pub base_url: String,
    /// Run start (milliseconds since epoch).
    pub started_at_ms: u64,
    /// Run duration.
    pub duration_ms: u64,
    /// Number of scenarios.
    pub total: usize,
    /// Number of passing scenarios.
    pub passed: usize,
    /// Number of failing scenarios.
    pub failed: usize,
    /// Per-scenario outcomes.
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Builds a report and derives its counters from `outcomes`.
    #[must_use]
    pub fn new(
        suite: String,
        base_url: String,
        started_at_ms: u64,
        duration_ms: u64,
        outcomes: Vec<ScenarioOutcome>,
    ) -> Self {
        let passed = outcomes.iter().filter(|outcome| outcome.passed()).count();
        Self {
            suite,
            base_url,
            started_at_ms,
            duration_ms,
            total: outcomes.len(),
            passed,
            failed: outcomes.len() - passed,
            outcomes,
        }
    }

    /// Returns true when every scenario passed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns the outcome for a scenario name.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    /// Iterates over failing outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }

    /// Renders a plain-text summary, one line per scenario.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "suite {} against {}", self.suite, self.base_url);
        for outcome in &self.outcomes {
            let verdict = if outcome.passed() { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "  [{verdict}] {} (expected {}, got {}, {} ms)",
                outcome.name,
                outcome.expected_status,
                status_label(outcome.actual_status),
                outcome.elapsed_ms
            );
            if let Some(failure) = &outcome.failure {
                for line in failure.message.lines() {
                    let _ = writeln!(out, "         {line}");
                }
            }
        }
        let _ = writeln!(
            out,
            "{} passed, {} failed, {} total in {} ms",
            self.passed, self.failed, self.total, self.duration_ms
        );
        out
    }

    /// Renders a markdown summary with a results table.
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Contract Suite: {}\n", self.suite);
        let _ = writeln!(out, "- Base URL: `{}`", self.base_url);
        let _ = writeln!(
            out,
            "- Result: {} passed, {} failed, {} total",
            self.passed, self.failed, self.total
        );
        let _ = writeln!(out, "- Duration: {} ms\n", self.duration_ms);
        out.push_str("## Scenarios\n\n");
        out.push_str("| Scenario | Expected | Actual | Verdict |\n");
        out.push_str("| --- | --- | --- | --- |\n");
        for outcome in &self.outcomes {
            let verdict = if outcome.passed() { "pass" } else { "fail" };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {verdict} |",
                outcome.name.replace('|', "\\|"),
                outcome.expected_status,
                status_label(outcome.actual_status)
            );
        }
        let failures: Vec<&ScenarioOutcome> = self.failures().collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n\n");
            for outcome in failures {
                if let Some(failure) = &outcome.failure {
                    let _ = writeln!(out, "### {}\n", outcome.name);
                    let _ = writeln!(out, "Kind: `{}/{}`\n", failure.category, failure.kind);
                    let _ = writeln!(out, "```text\n{}\n```\n", failure.message);
                }
            }
        }
        out
    }

    /// Writes `report.json` (JCS) and `report.md` into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the directory or a file cannot be
    /// written, or when the report cannot be canonicalized.
    pub fn write_artifacts(&self, dir: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
        fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let bytes =
            serde_jcs::to_vec(self).map_err(|err| ArtifactError::Serialize(err.to_string()))?;
        let json_path = dir.join(REPORT_JSON_FILE);
        write_file(&json_path, &bytes)?;
        let markdown_path = dir.join(REPORT_MARKDOWN_FILE);
        write_file(&markdown_path, self.render_markdown().as_bytes())?;
        Ok(vec![json_path, markdown_path])
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report artifact write failures.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Filesystem failure.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Canonical JSON serialization failure.
    #[error("failed to serialize report: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Formats an optional status code.
fn status_label(status: Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |status| status.to_string())
}

/// Writes bytes to a path, mapping failures to [`ArtifactError::Io`].
fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    fs::write(path, bytes).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}
