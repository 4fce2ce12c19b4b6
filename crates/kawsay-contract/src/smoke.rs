// crates/kawsay-contract/src/smoke.rs
// ============================================================================
// Module: Smoke Probe
// Description: One-shot bulk prediction against a live predictor.
// Purpose: Send a fixed four-record batch and tabulate the predictions.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The smoke probe sends the same mixed batch the happy-path scenario uses
//! and renders the predictions as a fixed-width table. Any transport failure,
//! non-200 status, or undecodable body is an error; the caller decides how
//! to surface it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use thiserror::Error;

use crate::model::DecodeError;
use crate::model::PredictionRequest;
use crate::model::PredictionResponse;
use crate::suites::mixed_batch;
use crate::transport::Payload;
use crate::transport::PredictorClient;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Horizontal rule framing the results table.
const TABLE_RULE: &str = concat!(
    "-------------------------------------------------",
    "------------------------------------------------",
);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Smoke probe failures.
#[derive(Debug, Error)]
pub enum SmokeError {
    /// Request never produced a response.
    #[error(
        "error sending request to prediction service: {0}\nIs the service running at the \
         configured base URL?"
    )]
    Transport(#[from] TransportError),
    /// Predictor answered with something other than 200.
    #[error("API returned a non-200 status code: {status}\nResponse body: {body}")]
    Status {
        /// Observed status.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// Body did not decode into predictions.
    #[error("error decoding response JSON: {0}")]
    Decode(#[from] DecodeError),
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Returns the fixed smoke batch.
#[must_use]
pub fn smoke_request() -> PredictionRequest {
    mixed_batch()
}

/// Sends the smoke batch and decodes the predictions.
///
/// # Errors
///
/// Returns [`SmokeError`] on transport failure, non-200 status, or decode failure.
pub async fn run_smoke(client: &PredictorClient) -> Result<PredictionResponse, SmokeError> {
    let exchange = client.bulk_predict(&Payload::Typed(smoke_request())).await?;
    if exchange.status != 200 {
        return Err(SmokeError::Status {
            status: exchange.status,
            body: exchange.body_text(),
        });
    }
    Ok(PredictionResponse::from_json_slice(&exchange.body)?)
}

/// Renders predictions as a fixed-width table with a header row.
#[must_use]
pub fn render_table(response: &PredictionResponse) -> String {
    let mut out = String::new();
    out.push_str("--- Prediction Results ---\n");
    out.push_str(TABLE_RULE);
    out.push('\n');
    let _ = writeln!(
        out,
        "{:<12} | {:<10} | {:<10} | {:<10} | {:<12} | Drivers",
        "Student ID", "Course ID", "Semester", "Outcome", "Confidence"
    );
    out.push_str(TABLE_RULE);
    out.push('\n');
    for prediction in &response.predictions {
        let _ = writeln!(
            out,
            "{:<12} | {:<10} | {:<10} | {:<10} | {:<12.2} | [{}]",
            prediction.student_id,
            prediction.course_id,
            prediction.semester,
            prediction.predicted_outcome.as_str(),
            prediction.confidence,
            prediction.drivers.join(", ")
        );
    }
    out
}
