// crates/kawsay-contract/src/suites.rs
// ============================================================================
// Module: Scenario Tables
// Description: Contract and model-behavior scenario tables for /bulk-predict.
// Purpose: Declare every contract case as data executed by the scenario engine.
// Dependencies: (crate-internal)
// ============================================================================

//! ## Overview
//! Two tables cover the predictor contract. [`bulk_predict`] exercises request
//! validation and the happy path; [`model_behavior`] exercises properties of
//! the model itself (identifier invariance, vocabulary, monotonicity).
//! Scenario names are stable; reports and system tests look cases up by name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::assertions::IDENTIFIER_TOLERANCE;
use crate::assertions::ContractViolation;
use crate::assertions::ensure;
use crate::assertions::ensure_eq;
use crate::assertions::ensure_identifier_invariant;
use crate::assertions::ensure_len;
use crate::assertions::ensure_member;
use crate::assertions::ensure_monotonic_pass;
use crate::assertions::ensure_order_preserved;
use crate::assertions::ensure_within;
use crate::model::GradeRecord;
use crate::model::PredictedOutcome;
use crate::model::PredictionRequest;
use crate::model::PredictionResponse;
use crate::scenario::Scenario;
use crate::transport::Payload;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Course identifiers the model was trained on.
pub const KNOWN_COURSE_IDS: [i64; 5] = [2, 11, 21, 31, 41];
/// Lowest accepted grade.
pub const GRADE_MIN: f64 = 0.0;
/// Highest accepted grade.
pub const GRADE_MAX: f64 = 100.0;
/// HTTP 200.
pub const STATUS_OK: u16 = 200;
/// HTTP 422.
pub const STATUS_UNPROCESSABLE: u16 = 422;

/// Scenario names for the bulk-predict table.
pub mod names {
    /// Four valid records across known courses.
    pub const HAPPY_PATH: &str = "Happy Path - Valid Mix of Records";
    /// Empty `records` array.
    pub const EMPTY_RECORDS: &str = "Validation Error - Empty Records Array";
    /// Lab grade above the range.
    pub const GRADE_OUT_OF_BOUNDS: &str = "Validation Error - Grade Out of Bounds";
    /// Masterclass grade below the range.
    pub const NEGATIVE_GRADE: &str = "Validation Error - Negative Grade";
    /// Raw JSON without `grade_lab`.
    pub const MISSING_FIELD: &str = "Validation Error - Missing Required Field";
    /// Body that is not JSON.
    pub const MALFORMED_JSON: &str = "Validation Error - Malformed JSON";
    /// Grades exactly at 0 and 100.
    pub const RANGE_LIMITS: &str = "Boundary - Grades at Range Limits";
    /// Confidence, drivers, and labels on a valid batch.
    pub const RESPONSE_SHAPE: &str = "Response Shape - Confidence and Drivers";
    /// Same features, different student id.
    pub const IDENTIFIER_INVARIANCE: &str = "Model Invariance to Identifier (studentId)";
    /// Course id outside the known vocabulary.
    pub const OUT_OF_VOCABULARY: &str = "Handles Out-of-Distribution Categorical Value";
    /// Higher grades yield higher PASS confidence.
    pub const MONOTONICITY: &str = "Model Monotonicity (Higher Grades -> Higher PASS Confidence)";
}

/// Raw body that omits `grade_lab`.
pub const MISSING_GRADE_LAB_BODY: &str = concat!(
    r#"{"records": [{"studentId": 2002, "courseId": 21, "#,
    r#""semester": 2, "grade_masterclass": 88.0}]}"#,
);

/// Raw body that is truncated mid-object.
pub const MALFORMED_JSON_BODY: &str = r#"{"records": [{"studentId": 2003, "courseId": 21,"#;

// ============================================================================
// SECTION: Suite Selection
// ============================================================================

/// Named scenario table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteName {
    /// Request validation and happy-path contract.
    BulkPredict,
    /// Model-level behavioral properties.
    ModelBehavior,
}

impl SuiteName {
    /// Every suite in run order.
    pub const ALL: [Self; 2] = [Self::BulkPredict, Self::ModelBehavior];

    /// Returns the stable suite label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BulkPredict => "bulk-predict",
            Self::ModelBehavior => "model-behavior",
        }
    }

    /// Builds the scenario table for this suite.
    #[must_use]
    pub fn scenarios(self) -> Vec<Scenario> {
        match self {
            Self::BulkPredict => bulk_predict(),
            Self::ModelBehavior => model_behavior(),
        }
    }
}

impl fmt::Display for SuiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuiteName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bulk-predict" => Ok(Self::BulkPredict),
            "model-behavior" => Ok(Self::ModelBehavior),
            other => Err(format!("unknown suite: {other}")),
        }
    }
}

/// Returns the scenario with `name` from `scenarios`.
#[must_use]
pub fn find<'a>(scenarios: &'a [Scenario], name: &str) -> Option<&'a Scenario> {
    scenarios.iter().find(|scenario| scenario.name == name)
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Mixed batch of four valid records; 1001/41 is the strong PASS case.
#[must_use]
pub fn mixed_batch() -> PredictionRequest {
    PredictionRequest::new(vec![
        GradeRecord::new(1001, 41, 1, 95.5, 92.0),
        GradeRecord::new(1002, 21, 2, 65.0, 88.0),
        GradeRecord::new(1001, 11, 2, 90.0, 61.5),
        GradeRecord::new(1003, 31, 3, 85.0, 89.0),
    ])
}

/// Returns the typed request behind a payload.
fn typed(payload: &Payload) -> Result<&PredictionRequest, ContractViolation> {
    payload
        .typed_request()
        .ok_or_else(|| ContractViolation::assertion("response check requires a typed payload"))
}

// ============================================================================
// SECTION: Bulk Predict Table
// ============================================================================

/// Builds the request-validation and happy-path table.
#[must_use]
pub fn bulk_predict() -> Vec<Scenario> {
    vec![
        Scenario::bulk_predict(names::HAPPY_PATH, mixed_batch(), STATUS_OK)
            .with_check(check_happy_path),
        Scenario::bulk_predict(
            names::EMPTY_RECORDS,
            PredictionRequest::new(Vec::new()),
            STATUS_UNPROCESSABLE,
        ),
        Scenario::bulk_predict(
            names::GRADE_OUT_OF_BOUNDS,
            PredictionRequest::new(vec![GradeRecord::new(2001, 41, 1, 101.0, 92.0)]),
            STATUS_UNPROCESSABLE,
        ),
        Scenario::bulk_predict(
            names::NEGATIVE_GRADE,
            PredictionRequest::new(vec![GradeRecord::new(2004, 41, 1, 80.0, -0.5)]),
            STATUS_UNPROCESSABLE,
        ),
        Scenario::bulk_predict(
            names::MISSING_FIELD,
            Payload::raw(MISSING_GRADE_LAB_BODY),
            STATUS_UNPROCESSABLE,
        ),
        Scenario::bulk_predict(
            names::MALFORMED_JSON,
            Payload::raw(MALFORMED_JSON_BODY),
            STATUS_UNPROCESSABLE,
        ),
        Scenario::bulk_predict(
            names::RANGE_LIMITS,
            PredictionRequest::new(vec![
                GradeRecord::new(2005, 2, 1, GRADE_MIN, GRADE_MIN),
                GradeRecord::new(2006, 2, 1, GRADE_MAX, GRADE_MAX),
            ]),
            STATUS_OK,
        )
        .with_check(|response, payload| ensure_order_preserved(typed(payload)?, response)),
        Scenario::bulk_predict(names::RESPONSE_SHAPE, mixed_batch(), STATUS_OK)
            .with_check(check_response_shape),
    ]
}

/// Four predictions in request order; student 1001 in course 41 passes.
fn check_happy_path(
    response: &PredictionResponse,
    payload: &Payload,
) -> Result<(), ContractViolation> {
    ensure_len("predictions", &response.predictions, 4)?;
    ensure_order_preserved(typed(payload)?, response)?;
    let strong = response
        .find(1001, 41)
        .ok_or_else(|| {
            ContractViolation::assertion("no prediction for student 1001 in course 41")
        })?;
    ensure_eq("student 1001 in course 41", &PredictedOutcome::Pass, &strong.predicted_outcome)
}

/// Confidence in [0, 1], at least one driver, keys echoed in order.
fn check_response_shape(
    response: &PredictionResponse,
    payload: &Payload,
) -> Result<(), ContractViolation> {
    ensure_order_preserved(typed(payload)?, response)?;
    for (index, prediction) in response.predictions.iter().enumerate() {
        ensure_within(&format!("prediction {index} confidence"), prediction.confidence, 0.0, 1.0)?;
        ensure(
            !prediction.drivers.is_empty(),
            format!("prediction {index} has no drivers"),
        )?;
        ensure(
            prediction.drivers.iter().all(|driver| !driver.trim().is_empty()),
            format!("prediction {index} has a blank driver"),
        )?;
        ensure_member(
            &format!("prediction {index} outcome"),
            &prediction.predicted_outcome,
            &[PredictedOutcome::Pass, PredictedOutcome::Fail],
        )?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Model Behavior Table
// ============================================================================

/// Builds the model-behavior table.
#[must_use]
pub fn model_behavior() -> Vec<Scenario> {
    let invariant = GradeRecord::new(1001, 41, 1, 95.0, 92.0);
    let baseline = GradeRecord::new(4001, 21, 2, 80.0, 80.0);
    vec![
        Scenario::bulk_predict(
            names::IDENTIFIER_INVARIANCE,
            PredictionRequest::new(vec![invariant, invariant.with_student_id(9999)]),
            STATUS_OK,
        )
        .with_check(|response, _| {
            ensure_len("predictions", &response.predictions, 2)?;
            ensure_identifier_invariant(
                &response.predictions[0],
                &response.predictions[1],
                IDENTIFIER_TOLERANCE,
            )
        }),
        Scenario::bulk_predict(
            names::OUT_OF_VOCABULARY,
            PredictionRequest::new(vec![GradeRecord::new(3001, 999, 1, 80.0, 80.0)]),
            STATUS_UNPROCESSABLE,
        ),
        Scenario::bulk_predict(
            names::MONOTONICITY,
            PredictionRequest::new(vec![
                baseline,
                baseline.with_student_id(4002).with_grades(95.0, 95.0),
            ]),
            STATUS_OK,
        )
        .with_check(|response, _| {
            ensure_len("predictions", &response.predictions, 2)?;
            ensure_monotonic_pass(&response.predictions[0], &response.predictions[1])
        }),
    ]
}
