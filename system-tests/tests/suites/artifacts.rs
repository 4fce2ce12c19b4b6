// system-tests/tests/suites/artifacts.rs
// ============================================================================
// Module: Artifact Tests
// Description: Summary artifact checks that need no live predictor.
// Purpose: Ensure per-test summaries are valid JSON readable by tooling.
// Dependencies: kawsay-contract, serde_json, helpers
// ============================================================================

//! ## Overview
//! Writes a summary through [`TestReporter`] and parses `summary.json` back.

use std::error::Error;
use std::fs;

use kawsay_contract::ScenarioOutcome;
use kawsay_contract::report::ScenarioFailure;

use crate::helpers::artifacts::SUMMARY_JSON;
use crate::helpers::artifacts::TestReporter;

#[test]
fn summary_json_parses_with_millisecond_fields() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("summary_json_parses_with_millisecond_fields")?;
    let outcome = ScenarioOutcome {
        name: "Rejects Empty Record List".to_string(),
        expected_status: 422,
        actual_status: Some(200),
        elapsed_ms: 17,
        failure: Some(ScenarioFailure {
            category: "contract",
            kind: "status",
            message: "expected status code 422, got 200".to_string(),
        }),
    };
    reporter.finish_outcome(&outcome)?;

    let bytes = fs::read(reporter.artifacts().root().join(SUMMARY_JSON))?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    if value["status"] != "fail" {
        return Err(format!("unexpected status: {}", value["status"]).into());
    }
    let started = value["started_at_ms"].as_u64().ok_or("started_at_ms is not a u64")?;
    let ended = value["ended_at_ms"].as_u64().ok_or("ended_at_ms is not a u64")?;
    if ended < started || started == 0 {
        return Err(format!("implausible timestamps {started}..{ended}").into());
    }
    if value["outcome"]["elapsed_ms"] != 17 || value["outcome"]["actual_status"] != 200 {
        return Err("outcome fields did not survive serialization".into());
    }
    Ok(())
}
