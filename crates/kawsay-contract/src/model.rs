// crates/kawsay-contract/src/model.rs
// ============================================================================
// Module: Wire Data Model
// Description: Typed request/response structures for the bulk predictor.
// Purpose: Encode grade batches and decode prediction payloads with fixed field names.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Pure serialization structures shared by every scenario. Field names are
//! fixed by the predictor contract (`studentId`, `grade_lab`, ...). Nothing in
//! this module validates ranges or vocabularies; the predictor is the authority
//! and the harness only observes the resulting status codes.
//! Invariants:
//! - Values are immutable after construction and never shared across scenarios.
//! - Decoding fails with [`DecodeError`] on invalid JSON or missing fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Response body decode failure.
///
/// # Invariants
/// - `reason` carries the parser message and never the raw body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {target} body: {reason}")]
pub struct DecodeError {
    /// Payload kind that failed to decode.
    pub target: &'static str,
    /// Parser failure description.
    pub reason: String,
}

impl DecodeError {
    /// Builds a decode error from a serde failure.
    fn from_serde(target: &'static str, err: &serde_json::Error) -> Self {
        Self {
            target,
            reason: err.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// One (student, course, semester) grade observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    /// Caller-supplied student identifier, opaque to the predictor.
    #[serde(rename = "studentId")]
    pub student_id: i64,
    /// Course identifier from the predictor's known vocabulary.
    #[serde(rename = "courseId")]
    pub course_id: i64,
    /// Semester identifier.
    pub semester: i64,
    /// Lab component grade.
    pub grade_lab: f64,
    /// Masterclass component grade.
    pub grade_masterclass: f64,
}

impl GradeRecord {
    /// Creates a grade record.
    #[must_use]
    pub const fn new(
        student_id: i64,
        course_id: i64,
        semester: i64,
        grade_lab: f64,
        grade_masterclass: f64,
    ) -> Self {
        Self {
            student_id,
            course_id,
            semester,
            grade_lab,
            grade_masterclass,
        }
    }

    /// Returns a copy carrying a different student identifier.
    #[must_use]
    pub const fn with_student_id(self, student_id: i64) -> Self {
        Self {
            student_id,
            ..self
        }
    }

    /// Returns a copy carrying different grades.
    #[must_use]
    pub const fn with_grades(self, grade_lab: f64, grade_masterclass: f64) -> Self {
        Self {
            grade_lab,
            grade_masterclass,
            ..self
        }
    }
}

/// Ordered batch of grade records sent to `POST /bulk-predict`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Records in submission order; responses must preserve this order.
    pub records: Vec<GradeRecord>,
}

impl PredictionRequest {
    /// Creates a request from ordered records.
    #[must_use]
    pub const fn new(records: Vec<GradeRecord>) -> Self {
        Self {
            records,
        }
    }

    /// Encodes the request into wire JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns a serde error when the request cannot be serialized.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

// ============================================================================
// SECTION: Response Types
// ============================================================================

/// Predicted outcome label.
///
/// # Invariants
/// - Wire labels are exactly `PASS` and `FAIL`; anything else fails decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictedOutcome {
    /// Student is predicted to pass.
    #[serde(rename = "PASS")]
    Pass,
    /// Student is predicted to fail.
    #[serde(rename = "FAIL")]
    Fail,
}

impl PredictedOutcome {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for PredictedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One prediction, keyed by the echoed record identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Echoed student identifier.
    #[serde(rename = "studentId")]
    pub student_id: i64,
    /// Echoed course identifier.
    #[serde(rename = "courseId")]
    pub course_id: i64,
    /// Echoed semester.
    pub semester: i64,
    /// Predicted outcome label.
    #[serde(rename = "predictedOutcome")]
    pub predicted_outcome: PredictedOutcome,
    /// Confidence score, conventionally within `[0, 1]`.
    pub confidence: f64,
    /// Human-readable feature-importance labels (order not significant).
    pub drivers: Vec<String>,
}

impl Prediction {
    /// Returns true when the prediction echoes the record's key fields.
    #[must_use]
    pub const fn echoes(&self, record: &GradeRecord) -> bool {
        self.student_id == record.student_id
            && self.course_id == record.course_id
            && self.semester == record.semester
    }
}

/// Ordered predictions, one per submitted record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Predictions in request order.
    pub predictions: Vec<Prediction>,
}

impl PredictionResponse {
    /// Decodes a prediction response from raw body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the body is not valid JSON or omits
    /// required fields.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes)
            .map_err(|err| DecodeError::from_serde("prediction response", &err))
    }

    /// Returns the first prediction matching a student and course pair.
    #[must_use]
    pub fn find(&self, student_id: i64, course_id: i64) -> Option<&Prediction> {
        self.predictions
            .iter()
            .find(|prediction| {
                prediction.student_id == student_id && prediction.course_id == course_id
            })
    }
}

// ============================================================================
// SECTION: Health Types
// ============================================================================

/// Overall predictor health label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Model loaded and serving.
    Ok,
    /// Service is up but cannot predict.
    Degraded,
}

impl HealthStatus {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Degraded => "degraded",
        }
    }
}

/// Model availability label reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelAvailability {
    /// Model artifact is loaded.
    Loaded,
    /// Model artifact failed to load.
    Unavailable,
}

impl ModelAvailability {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Per-dependency health breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthServices {
    /// Model availability.
    pub model: ModelAvailability,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status.
    pub status: HealthStatus,
    /// Dependency breakdown.
    pub services: HealthServices,
}

impl HealthReport {
    /// Decodes a health report from raw body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the body is not a valid health payload.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(|err| DecodeError::from_serde("health", &err))
    }

    /// Returns true when the predictor reports a loaded model.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == HealthStatus::Ok && self.services.model == ModelAvailability::Loaded
    }
}

// ============================================================================
// SECTION: Error Envelope
// ============================================================================

/// Field-level validation issue reported by the predictor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Dotted field path, e.g. `records.0.grade_lab`.
    pub field: String,
    /// Human-readable issue.
    pub issue: String,
}

/// Error payload nested inside [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code such as `VALIDATION_ERROR` or `MODEL_NOT_LOADED`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional field-level details.
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

/// Structured error body emitted by the predictor on rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error payload.
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    /// Best-effort decode of an error body; `None` when the shape differs.
    #[must_use]
    pub fn from_json_slice(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}
