// crates/kawsay-contract/src/scenario.rs
// ============================================================================
// Module: Scenario Engine
// Description: Table-driven scenario definitions and their single driver.
// Purpose: Execute named payload/status/check cases independently and report verdicts.
// Dependencies: reqwest, thiserror, tokio
// ============================================================================

//! ## Overview
//! A [`Scenario`] pairs a payload with an expected status and an optional
//! check over the decoded response. [`ScenarioRunner`] executes each case in
//! four steps: encode the payload (or take raw bytes verbatim), execute it,
//! assert the status (hard stop), then decode and run the check.
//! Invariants:
//! - Scenarios share no mutable state; the HTTP client is the only shared resource.
//! - A transport failure or violation fails its own scenario only.
//! - Suite reports list outcomes in table order regardless of run mode.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::assertions::ContractViolation;
use crate::assertions::assert_status;
use crate::assertions::decode_predictions;
use crate::config::HarnessConfig;
use crate::events::ScenarioEvent;
use crate::events::ScenarioEventParams;
use crate::events::duration_millis;
use crate::events::unix_millis;
use crate::model::PredictionResponse;
use crate::report::ScenarioFailure;
use crate::report::ScenarioOutcome;
use crate::report::SuiteReport;
use crate::transport::BULK_PREDICT_PATH;
use crate::transport::Exchange;
use crate::transport::Payload;
use crate::transport::PredictorClient;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Check applied to a decoded response; receives the scenario payload too.
pub type ResponseCheck =
    Arc<dyn Fn(&PredictionResponse, &Payload) -> Result<(), ContractViolation> + Send + Sync>;

/// One named contract case.
#[derive(Clone)]
pub struct Scenario {
    /// Human-readable scenario name, unique within a suite.
    pub name: String,
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL.
    pub path: String,
    /// Request payload.
    pub payload: Payload,
    /// Expected HTTP status.
    pub expected_status: u16,
    /// Optional check over the decoded response.
    pub check: Option<ResponseCheck>,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("payload", &self.payload)
            .field("expected_status", &self.expected_status)
            .field("check", &self.check.as_ref().map(|_| "<check>"))
            .finish()
    }
}

impl Scenario {
    /// Creates a `POST /bulk-predict` scenario without a response check.
    #[must_use]
    pub fn bulk_predict(
        name: impl Into<String>,
        payload: impl Into<Payload>,
        expected_status: u16,
    ) -> Self {
        Self {
            name: name.into(),
            method: Method::POST,
            path: BULK_PREDICT_PATH.to_string(),
            payload: payload.into(),
            expected_status,
            check: None,
        }
    }

    /// Attaches a response check.
    #[must_use]
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&PredictionResponse, &Payload) -> Result<(), ContractViolation>
            + Send
            + Sync
            + 'static,
    {
        self.check = Some(Arc::new(check));
        self
    }

    /// Overrides the method and path.
    #[must_use]
    pub fn with_target(mut self, method: Method, path: impl Into<String>) -> Self {
        self.method = method;
        self.path = path.into();
        self
    }

    /// Verifies an exchange against the expected status and the check.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation`] on a status mismatch, a decode failure,
    /// or a failed check.
    pub fn verify(&self, exchange: &Exchange) -> Result<(), ContractViolation> {
        assert_status(exchange, self.expected_status)?;
        if let Some(check) = &self.check {
            let response = decode_predictions(exchange)?;
            check(&response, &self.payload)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scenario failure.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Request never produced a response.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    /// Response did not satisfy the contract.
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
}

impl ScenarioError {
    /// Returns the failure category label.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Contract(_) => "contract",
        }
    }

    /// Returns the detailed failure kind label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(err) => err.kind(),
            Self::Contract(err) => err.kind(),
        }
    }
}

// ============================================================================
// SECTION: Run Mode
// ============================================================================

/// Execution strategy for a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// One scenario at a time, in table order.
    #[default]
    Serial,
    /// Up to `workers` scenarios concurrently.
    Parallel {
        /// Maximum concurrent scenarios.
        workers: NonZeroUsize,
    },
}

impl RunMode {
    /// Derives the run mode from configuration; one worker means serial.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        match config.parallelism {
            Some(workers) if workers.get() > 1 => Self::Parallel {
                workers,
            },
            _ => Self::Serial,
        }
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Drives scenarios through a [`PredictorClient`].
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Shared HTTP client.
    client: PredictorClient,
    /// Suite label attached to events and reports.
    suite: String,
}

impl ScenarioRunner {
    /// Creates a runner with the default suite label.
    #[must_use]
    pub fn new(client: PredictorClient) -> Self {
        Self {
            client,
            suite: "adhoc".to_string(),
        }
    }

    /// Sets the suite label.
    #[must_use]
    pub fn with_suite_label(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &PredictorClient {
        &self.client
    }

    /// Executes one scenario and returns the exchange when it passes.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Transport`] when no response arrived and
    /// [`ScenarioError::Contract`] when the response broke the contract.
    pub async fn execute(&self, scenario: &Scenario) -> Result<Exchange, ScenarioError> {
        let exchange = self
            .client
            .execute(scenario.method.clone(), &scenario.path, Some(&scenario.payload))
            .await?;
        scenario.verify(&exchange)?;
        Ok(exchange)
    }

    /// Executes one scenario and folds the result into an outcome.
    pub async fn run(&self, scenario: &Scenario) -> ScenarioOutcome {
        let started = Instant::now();
        let result = self.execute(scenario).await;
        let actual_status = match &result {
            Ok(exchange) => Some(exchange.status),
            Err(ScenarioError::Contract(ContractViolation::Status {
                actual,
                ..
            })) => Some(*actual),
            Err(ScenarioError::Contract(_)) => Some(scenario.expected_status),
            Err(ScenarioError::Transport(_)) => None,
        };
        let failure = result.err().map(|err| ScenarioFailure {
            category: err.category(),
            kind: err.kind(),
            message: err.to_string(),
        });
        let outcome = ScenarioOutcome {
            name: scenario.name.clone(),
            expected_status: scenario.expected_status,
            actual_status,
            elapsed_ms: duration_millis(started.elapsed()),
            failure,
        };
        self.record(&outcome);
        outcome
    }

    /// Runs every scenario and returns a report in table order.
    pub async fn run_suite(&self, scenarios: &[Scenario], mode: RunMode) -> SuiteReport {
        let started_at_ms = unix_millis();
        let started = Instant::now();
        let outcomes = match mode {
            RunMode::Serial => {
                let mut outcomes = Vec::with_capacity(scenarios.len());
                for scenario in scenarios {
                    outcomes.push(self.run(scenario).await);
                }
                outcomes
            }
            RunMode::Parallel {
                workers,
            } => self.run_parallel(scenarios, workers).await,
        };
        SuiteReport::new(
            self.suite.clone(),
            self.client.base_url().to_string(),
            started_at_ms,
            duration_millis(started.elapsed()),
            outcomes,
        )
    }

    /// Runs scenarios on tokio tasks bounded by a semaphore.
    async fn run_parallel(
        &self,
        scenarios: &[Scenario],
        workers: NonZeroUsize,
    ) -> Vec<ScenarioOutcome> {
        let permits = Arc::new(Semaphore::new(workers.get()));
        let mut handles = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let runner = self.clone();
            let task_scenario = scenario.clone();
            let permits = Arc::clone(&permits);
            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                runner.run(&task_scenario).await
            });
            handles.push((scenario, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (scenario, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let outcome = ScenarioOutcome {
                        name: scenario.name.clone(),
                        expected_status: scenario.expected_status,
                        actual_status: None,
                        elapsed_ms: 0,
                        failure: Some(ScenarioFailure {
                            category: "contract",
                            kind: "aborted",
                            message: format!("scenario task aborted: {err}"),
                        }),
                    };
                    self.record(&outcome);
                    outcome
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Emits a scenario event for an outcome.
    fn record(&self, outcome: &ScenarioOutcome) {
        self.client.events().record_scenario(&ScenarioEvent::new(ScenarioEventParams {
            suite: self.suite.clone(),
            scenario: outcome.name.clone(),
            expected_status: outcome.expected_status,
            actual_status: outcome.actual_status,
            passed: outcome.passed(),
            failure_kind: outcome.failure.as_ref().map(|failure| failure.kind),
            message: outcome.failure.as_ref().map(|failure| failure.message.clone()),
        }));
    }
}
