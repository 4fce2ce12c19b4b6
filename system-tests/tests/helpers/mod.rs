// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Kawsay system-tests.
// Purpose: Provide predictor readiness and artifact utilities.
// Dependencies: system-tests, kawsay-contract
// ============================================================================

//! ## Overview
//! Shared helpers for Kawsay system-tests.
//! Invariants:
//! - Every test waits for a loaded model before sending contract requests.
//! - Every test writes a summary artifact, even when it panics.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod readiness;
pub mod scenarios;
