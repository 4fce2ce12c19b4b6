// crates/kawsay-contract/src/lib.rs
// ============================================================================
// Module: Kawsay Contract Library
// Description: Black-box contract harness for the Kawsay bulk predictor.
// Purpose: Model, transport, assertion, and scenario-table layers for contract checks.
// Dependencies: reqwest, serde, serde_json, serde_jcs, thiserror, tokio, url
// ============================================================================

//! ## Overview
//! Kawsay Contract verifies a remote pass/fail predictor purely through its
//! HTTP+JSON surface. Scenarios pair a payload with an expected status and an
//! optional response check; the [`ScenarioRunner`] executes them through the
//! [`PredictorClient`] and folds results into a [`SuiteReport`].
//! Invariants:
//! - The predictor is opaque; only status codes and response shapes are checked.
//! - Each scenario is independent; a failure never affects sibling scenarios.
//! - Transport failures are reported once and never retried.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod config;
pub mod events;
pub mod model;
pub mod readiness;
pub mod report;
pub mod scenario;
pub mod smoke;
pub mod suites;
pub mod transport;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assertions::ContractViolation;
pub use assertions::assert_status;
pub use config::HarnessConfig;
pub use events::EventSink;
pub use model::DecodeError;
pub use model::GradeRecord;
pub use model::PredictedOutcome;
pub use model::Prediction;
pub use model::PredictionRequest;
pub use model::PredictionResponse;
pub use report::ScenarioOutcome;
pub use report::SuiteReport;
pub use scenario::RunMode;
pub use scenario::Scenario;
pub use scenario::ScenarioError;
pub use scenario::ScenarioRunner;
pub use transport::Exchange;
pub use transport::Payload;
pub use transport::PredictorClient;
pub use transport::TransportError;
