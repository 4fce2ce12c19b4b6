// system-tests/src/lib.rs
// ============================================================================
// Module: Kawsay System Tests Library
// Description: Shared configuration for live-predictor system tests.
// Purpose: Provide common settings for the system-test binaries.
// Dependencies: kawsay-contract
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the live-predictor
//! system-test binaries in `system-tests/tests`. The predictor location
//! itself comes from the contract library configuration (`BASE_URL`).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
