// crates/kawsay-contract/src/assertions.rs
// ============================================================================
// Module: Contract Assertions
// Description: Status and structural assertions with rich failure diagnostics.
// Purpose: Turn observed exchanges into pass/fail verdicts without panicking.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Assertions return [`ContractViolation`] instead of panicking so a failing
//! scenario is reported and its siblings keep running. [`assert_status`] is a
//! hard stop for a scenario; structural helpers are composed ad hoc by each
//! scenario check because tolerance and ordering rules differ per property.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;

use thiserror::Error;

use crate::model::DecodeError;
use crate::model::ErrorEnvelope;
use crate::model::PredictedOutcome;
use crate::model::Prediction;
use crate::model::PredictionRequest;
use crate::model::PredictionResponse;
use crate::transport::Exchange;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Absolute confidence tolerance for identifier invariance.
pub const IDENTIFIER_TOLERANCE: f64 = 0.0001;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Mismatch between observed and expected contract behavior.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// Status code differs from the expected one.
    #[error("expected status code {expected}, got {actual}. Path: {path}\nResponse body: {body}")]
    Status {
        /// Requested path.
        path: String,
        /// Expected status code.
        expected: u16,
        /// Observed status code.
        actual: u16,
        /// Raw response body (lossy UTF-8).
        body: String,
        /// Predictor error code when the body carried an error envelope.
        error_code: Option<String>,
    },
    /// Response body did not decode into the expected shape.
    #[error("response for {path} failed to decode: {source}\nResponse body: {body}")]
    Decode {
        /// Requested path.
        path: String,
        /// Decode failure.
        source: DecodeError,
        /// Raw response body (lossy UTF-8).
        body: String,
    },
    /// Structural assertion failed.
    #[error("{message}")]
    Assertion {
        /// Failure description.
        message: String,
    },
}

impl ContractViolation {
    /// Builds a structural assertion failure.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Returns a stable label for event logs and reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Status {
                ..
            } => "status",
            Self::Decode {
                ..
            } => "decode",
            Self::Assertion {
                ..
            } => "assertion",
        }
    }
}

// ============================================================================
// SECTION: Exchange Assertions
// ============================================================================

/// Fails when the observed status differs from `expected`.
///
/// # Errors
///
/// Returns [`ContractViolation::Status`] with the path and raw body.
pub fn assert_status(exchange: &Exchange, expected: u16) -> Result<(), ContractViolation> {
    if exchange.status == expected {
        return Ok(());
    }
    let error_code =
        ErrorEnvelope::from_json_slice(&exchange.body).map(|envelope| envelope.error.code);
    Err(ContractViolation::Status {
        path: exchange.path.clone(),
        expected,
        actual: exchange.status,
        body: exchange.body_text(),
        error_code,
    })
}

/// Decodes a prediction response from an exchange body.
///
/// # Errors
///
/// Returns [`ContractViolation::Decode`] when the body does not decode.
pub fn decode_predictions(exchange: &Exchange) -> Result<PredictionResponse, ContractViolation> {
    PredictionResponse::from_json_slice(&exchange.body).map_err(|source| ContractViolation::Decode {
        path: exchange.path.clone(),
        source,
        body: exchange.body_text(),
    })
}

// ============================================================================
// SECTION: Structural Helpers
// ============================================================================

/// Fails with `message` unless `condition` holds.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), ContractViolation> {
    if condition { Ok(()) } else { Err(ContractViolation::assertion(message)) }
}

/// Fails unless `actual == expected`.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] on inequality.
pub fn ensure_eq<T: PartialEq + Display>(
    label: &str,
    expected: &T,
    actual: &T,
) -> Result<(), ContractViolation> {
    ensure(actual == expected, format!("{label}: expected {expected}, got {actual}"))
}

/// Fails unless the slice holds exactly `expected` items.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] on a length mismatch.
pub fn ensure_len<T>(label: &str, items: &[T], expected: usize) -> Result<(), ContractViolation> {
    ensure(
        items.len() == expected,
        format!("{label}: expected {expected} items, got {}", items.len()),
    )
}

/// Fails unless `|left - right| < delta`.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] when the values are too far apart.
pub fn ensure_in_delta(
    label: &str,
    left: f64,
    right: f64,
    delta: f64,
) -> Result<(), ContractViolation> {
    let diff = (left - right).abs();
    ensure(diff < delta, format!("{label}: |{left} - {right}| = {diff} is not below {delta}"))
}

/// Fails unless `greater > lesser`.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] when the ordering does not hold.
pub fn ensure_greater(label: &str, greater: f64, lesser: f64) -> Result<(), ContractViolation> {
    ensure(greater > lesser, format!("{label}: expected {greater} > {lesser}"))
}

/// Fails unless `min <= value <= max`.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] when the value is out of range.
pub fn ensure_within(label: &str, value: f64, min: f64, max: f64) -> Result<(), ContractViolation> {
    ensure((min..=max).contains(&value), format!("{label}: {value} is outside [{min}, {max}]"))
}

/// Fails unless `value` is one of `allowed`.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] when the value is not a member.
pub fn ensure_member<T: PartialEq + Display>(
    label: &str,
    value: &T,
    allowed: &[T],
) -> Result<(), ContractViolation> {
    if allowed.contains(value) {
        return Ok(());
    }
    let allowed = allowed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
    Err(ContractViolation::assertion(format!("{label}: {value} is not one of [{allowed}]")))
}

// ============================================================================
// SECTION: Relational Checks
// ============================================================================

/// Fails unless the response has one prediction per record, in request order.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] on a cardinality or order mismatch.
pub fn ensure_order_preserved(
    request: &PredictionRequest,
    response: &PredictionResponse,
) -> Result<(), ContractViolation> {
    ensure_len("predictions", &response.predictions, request.records.len())?;
    for (index, (record, prediction)) in
        request.records.iter().zip(&response.predictions).enumerate()
    {
        ensure(
            prediction.echoes(record),
            format!(
                "prediction {index} echoes (student {}, course {}, semester {}) but request had \
                 (student {}, course {}, semester {})",
                prediction.student_id,
                prediction.course_id,
                prediction.semester,
                record.student_id,
                record.course_id,
                record.semester
            ),
        )?;
    }
    Ok(())
}

/// Fails unless two predictions agree in outcome and confidence within `tolerance`.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] when the predictions diverge.
pub fn ensure_identifier_invariant(
    first: &Prediction,
    second: &Prediction,
    tolerance: f64,
) -> Result<(), ContractViolation> {
    ensure_eq("predicted outcome", &first.predicted_outcome, &second.predicted_outcome)?;
    ensure_in_delta("confidence", first.confidence, second.confidence, tolerance)
}

/// Fails unless both predictions PASS and `improved` is strictly more confident.
///
/// Label flips between baseline and improved records are outside this check.
///
/// # Errors
///
/// Returns [`ContractViolation::Assertion`] when either label is not PASS or
/// the confidence does not strictly increase.
pub fn ensure_monotonic_pass(
    baseline: &Prediction,
    improved: &Prediction,
) -> Result<(), ContractViolation> {
    ensure_eq("baseline outcome", &PredictedOutcome::Pass, &baseline.predicted_outcome)?;
    ensure_eq("improved outcome", &PredictedOutcome::Pass, &improved.predicted_outcome)?;
    ensure_greater(
        "higher grades should yield higher PASS confidence",
        improved.confidence,
        baseline.confidence,
    )
}
