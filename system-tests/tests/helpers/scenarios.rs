// system-tests/tests/helpers/scenarios.rs
// ============================================================================
// Module: Scenario Helpers
// Description: Runs one named table scenario against the live predictor.
// Purpose: Give every contract case its own test with its own artifacts.
// Dependencies: kawsay-contract
// ============================================================================

use std::error::Error;

use kawsay_contract::ScenarioRunner;
use kawsay_contract::suites;
use kawsay_contract::suites::SuiteName;

use super::artifacts::TestReporter;
use super::readiness::ready_client;

/// Runs the scenario `name` from `suite` and records its summary artifact.
pub async fn run_table_scenario(
    test_name: &str,
    suite: SuiteName,
    name: &str,
) -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new(test_name)?;
    let client = ready_client().await?;
    let table = suite.scenarios();
    let scenario = suites::find(&table, name).ok_or_else(|| format!("no scenario named {name}"))?;
    let runner = ScenarioRunner::new(client.clone()).with_suite_label(suite.as_str());
    let outcome = runner.run(scenario).await;
    reporter.finish_outcome(&outcome)?;
    match outcome.failure {
        None => Ok(()),
        Some(failure) => Err(format!("{name}: {}", failure.message).into()),
    }
}
