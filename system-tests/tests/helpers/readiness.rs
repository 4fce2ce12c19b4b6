// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness gate for the live predictor.
// Purpose: Ensure the model is loaded without arbitrary sleeps.
// Dependencies: kawsay-contract, system-tests
// ============================================================================

use kawsay_contract::PredictorClient;
use kawsay_contract::readiness::wait_for_ready;
use kawsay_contract::transport::shared_client;
use system_tests::config::SystemTestConfig;

/// Returns the shared client once the predictor reports a loaded model.
pub async fn ready_client() -> Result<&'static PredictorClient, String> {
    let config = SystemTestConfig::load()?;
    let client = shared_client().map_err(|err| err.to_string())?;
    wait_for_ready(client, config.ready_timeout()).await.map_err(|err| {
        format!("{err} (base url {})", client.base_url())
    })?;
    Ok(client)
}
