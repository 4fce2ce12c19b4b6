// crates/kawsay-contract/src/readiness.rs
// ============================================================================
// Module: Readiness Probe
// Description: Health polling for the predictor service.
// Purpose: Wait for a loaded model without arbitrary sleeps.
// Dependencies: thiserror, tokio
// ============================================================================

//! ## Overview
//! The predictor reports `{"status": "ok", "services": {"model": "loaded"}}`
//! once its model is available. [`wait_for_ready`] polls `GET /health` until
//! that holds or the deadline passes. Polling is opt-in; scenarios never
//! retry on their own. Each change in the not-ready condition is logged as a
//! `transport_notice` and otherwise swallowed until the deadline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use thiserror::Error;
use tokio::time::sleep;

use crate::events::NoticeEvent;
use crate::model::HealthReport;
use crate::transport::HEALTH_PATH;
use crate::transport::PredictorClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delay between health probes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Readiness failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadinessError {
    /// The deadline passed before the predictor reported ready.
    #[error("predictor not ready after {attempts} attempts: {last}")]
    Timeout {
        /// Number of probes sent.
        attempts: u32,
        /// Last observed condition.
        last: String,
    },
}

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Sends one health probe and describes why the predictor is not ready.
///
/// # Errors
///
/// Returns a description of the transport failure, unexpected status,
/// undecodable body, or degraded state.
pub async fn probe_health(client: &PredictorClient) -> Result<HealthReport, String> {
    let exchange = client.health().await.map_err(|err| err.to_string())?;
    if exchange.status != 200 {
        return Err(format!("health returned status {}: {}", exchange.status, exchange.body_text()));
    }
    let report = HealthReport::from_json_slice(&exchange.body).map_err(|err| err.to_string())?;
    if report.is_ready() {
        Ok(report)
    } else {
        Err(format!(
            "health status {} with model {}",
            report.status.as_str(),
            report.services.model.as_str()
        ))
    }
}

/// Polls `/health` until the predictor is ready or `timeout` expires.
///
/// # Errors
///
/// Returns [`ReadinessError::Timeout`] with the last observed condition.
pub async fn wait_for_ready(
    client: &PredictorClient,
    timeout: Duration,
) -> Result<HealthReport, ReadinessError> {
    let start = Instant::now();
    let events = client.events();
    let mut attempts = 0u32;
    let mut previous: Option<String> = None;
    loop {
        attempts = attempts.saturating_add(1);
        match probe_health(client).await {
            Ok(report) => return Ok(report),
            Err(last) => {
                if previous.as_deref() != Some(last.as_str()) {
                    events.record_notice(&NoticeEvent::new("not_ready", HEALTH_PATH, last.clone()));
                    previous = Some(last.clone());
                }
                if start.elapsed() >= timeout {
                    return Err(ReadinessError::Timeout {
                        attempts,
                        last,
                    });
                }
                sleep(POLL_INTERVAL).await;
            }
        }
    }
}
