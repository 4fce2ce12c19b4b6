// crates/kawsay-contract/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for the Kawsay contract harness.
// Purpose: Provide typed access to harness environment settings and defaults.
// Dependencies: std, url
// ============================================================================

//! ## Overview
//! Harness configuration is read from environment variables and mapped into a
//! small typed structure shared by the transport, the engine, and the CLI.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ConfigError;
pub use env::DEFAULT_BASE_URL;
pub use env::EventLogTarget;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::parse_base_url;
pub use env::read_env_strict;
