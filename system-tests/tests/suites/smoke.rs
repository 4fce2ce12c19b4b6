// system-tests/tests/suites/smoke.rs
// ============================================================================
// Module: Smoke Tests
// Description: Fixed four-record batch against the live predictor.
// Purpose: Fail fast when the predictor is unreachable or unhealthy.
// Dependencies: kawsay-contract, helpers
// ============================================================================

//! ## Overview
//! Sends the smoke batch, checks one prediction per record, and archives the
//! rendered results table.

use std::error::Error;

use kawsay_contract::smoke::render_table;
use kawsay_contract::smoke::run_smoke;
use kawsay_contract::smoke::smoke_request;

use crate::helpers::artifacts::TestReporter;
use crate::helpers::readiness::ready_client;

#[tokio::test(flavor = "multi_thread")]
async fn smoke_batch_returns_one_prediction_per_record() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("smoke_batch_returns_one_prediction_per_record")?;
    let client = ready_client().await?;
    let response = run_smoke(client).await?;
    reporter.artifacts().write_text("predictions.txt", &render_table(&response))?;
    reporter.artifacts().write_json("predictions.json", &response)?;

    let expected = smoke_request().records.len();
    if response.predictions.len() != expected {
        reporter.finish("fail", vec![format!(
            "expected {expected} predictions, got {}",
            response.predictions.len()
        )])?;
        return Err("smoke prediction count mismatch".into());
    }
    reporter.finish("pass", vec!["smoke batch answered".to_string()])?;
    Ok(())
}
