// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, kawsay-contract, serde, serde_jcs
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use kawsay_contract::ScenarioOutcome;
use kawsay_contract::events::unix_millis;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// File name of the canonical JSON summary.
pub const SUMMARY_JSON: &str = "summary.json";

/// Summary written to [`SUMMARY_JSON`] for every test.
#[derive(Debug, Serialize)]
struct TestSummary {
    test_name: String,
    status: String,
    started_at_ms: u64,
    ended_at_ms: u64,
    duration_ms: u64,
    notes: Vec<String>,
    outcome: Option<ScenarioOutcome>,
}

fn resolve_root(config: &SystemTestConfig, test_name: &str) -> io::Result<PathBuf> {
    let Some(base) = &config.run_root else {
        return Ok(PathBuf::from("target/system-tests")
            .join(format!("run_{}", unix_millis()))
            .join(test_name));
    };
    let root = base.join(test_name);
    let occupied = fs::read_dir(&root).map(|mut entries| entries.next().is_some()).unwrap_or(false);
    if occupied && !config.allow_overwrite {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("run root {} is not empty; set overwrite to reuse it", root.display()),
        ));
    }
    Ok(root)
}

/// Artifact manager for a single system-test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the artifact root for a test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let root = resolve_root(&config, test_name)?;
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory for the test artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact with UTF-8 encoding.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }
}

/// Helper that writes summaries even when a test panics.
pub struct TestReporter {
    artifacts: TestArtifacts,
    test_name: String,
    started_at_ms: u64,
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self {
            artifacts: TestArtifacts::new(test_name)?,
            test_name: test_name.to_string(),
            started_at_ms: unix_millis(),
            finalized: false,
        })
    }

    /// Returns the artifact manager.
    pub fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes the summary for a scenario outcome.
    pub fn finish_outcome(&mut self, outcome: &ScenarioOutcome) -> io::Result<()> {
        let status = if outcome.passed() { "pass" } else { "fail" };
        let notes = outcome.failure.iter().map(|failure| failure.message.clone()).collect();
        self.write_summary(status, notes, Some(outcome.clone()))
    }

    /// Writes the final summary for the test.
    pub fn finish(&mut self, status: &str, notes: Vec<String>) -> io::Result<()> {
        self.write_summary(status, notes, None)
    }

    fn write_summary(
        &mut self,
        status: &str,
        notes: Vec<String>,
        outcome: Option<ScenarioOutcome>,
    ) -> io::Result<()> {
        let ended_at_ms = unix_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes,
            outcome,
        };
        self.artifacts.write_json(SUMMARY_JSON, &summary)?;
        self.artifacts.write_text("summary.md", &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish(status, vec!["test terminated without explicit summary".to_string()]);
    }
}

fn summary_markdown(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str("# System-Test Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Test: {}", summary.test_name);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    if let Some(outcome) = &summary.outcome {
        let actual =
            outcome.actual_status.map_or_else(|| "none".to_string(), |status| status.to_string());
        let _ = writeln!(out, "- Expected status: {}", outcome.expected_status);
        let _ = writeln!(out, "- Actual status: {actual}");
    }
    out.push_str("\n## Notes\n\n");
    if summary.notes.is_empty() {
        out.push_str("- None\n");
    } else {
        for note in &summary.notes {
            let _ = writeln!(out, "- {note}");
        }
    }
    out
}
