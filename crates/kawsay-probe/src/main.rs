// crates/kawsay-probe/src/main.rs
// ============================================================================
// Module: Kawsay Probe CLI Entry Point
// Description: Command dispatcher for smoke, contract, and health checks.
// Purpose: Run the contract harness against a live predictor from a shell.
// Dependencies: clap, kawsay-contract, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! `kawsay-probe` wraps the contract library in three subcommands:
//! `smoke` sends the fixed four-record batch and prints a results table,
//! `contract` runs the scenario tables and prints a suite report, and
//! `health` checks (or waits for) a loaded model. Environment configuration
//! is loaded first and CLI flags override it. Any failed check exits 1.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use kawsay_contract::HarnessConfig;
use kawsay_contract::PredictorClient;
use kawsay_contract::RunMode;
use kawsay_contract::ScenarioRunner;
use kawsay_contract::SuiteReport;
use kawsay_contract::config::EventLogTarget;
use kawsay_contract::readiness::probe_health;
use kawsay_contract::readiness::wait_for_ready;
use kawsay_contract::smoke::render_table;
use kawsay_contract::smoke::run_smoke;
use kawsay_contract::smoke::smoke_request;
use kawsay_contract::suites::SuiteName;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "kawsay-probe", version, disable_help_subcommand = true)]
struct Cli {
    /// Predictor base URL (overrides `BASE_URL`).
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,
    /// Event log target: `stderr`, `off`, or a file path (overrides `KAWSAY_EVENT_LOG`).
    #[arg(long, value_name = "TARGET", global = true)]
    event_log: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send the fixed four-record batch and print the predictions.
    Smoke,
    /// Run contract scenario tables and print a suite report.
    Contract(ContractCommand),
    /// Check predictor health.
    Health(HealthCommand),
}

/// Arguments for `contract`.
#[derive(Args, Debug)]
struct ContractCommand {
    /// Scenario table to run.
    #[arg(long, value_enum, default_value_t = SuiteArg::All)]
    suite: SuiteArg,
    /// Run up to N scenarios concurrently (overrides `KAWSAY_PARALLELISM`).
    #[arg(long, value_name = "N")]
    parallel: Option<NonZeroUsize>,
    /// Write report artifacts under this directory (overrides `KAWSAY_RUN_ROOT`).
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,
    /// Report output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `health`.
#[derive(Args, Debug)]
struct HealthCommand {
    /// Poll until ready for up to this many seconds instead of probing once.
    #[arg(long, value_name = "SECS")]
    wait_secs: Option<u64>,
}

/// Suite selector.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum SuiteArg {
    /// Request validation and happy-path table.
    BulkPredict,
    /// Model behavior table.
    ModelBehavior,
    /// Every table in order.
    All,
}

impl SuiteArg {
    /// Expands the selector into concrete suites.
    fn suites(self) -> Vec<SuiteName> {
        match self {
            Self::BulkPredict => vec![SuiteName::BulkPredict],
            Self::ModelBehavior => vec![SuiteName::ModelBehavior],
            Self::All => SuiteName::ALL.to_vec(),
        }
    }
}

/// Report output format.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON array of suite reports.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_config =
        HarnessConfig::load().map_err(|err| CliError::new(format!("configuration error: {err}")))?;
    let mut config = apply_global_overrides(env_config, &cli)?;
    if let Commands::Contract(command) = &cli.command {
        config = apply_contract_overrides(config, command);
    }
    let client = PredictorClient::new(&config)
        .map_err(|err| CliError::new(format!("failed to build client: {err}")))?;

    match cli.command {
        Commands::Smoke => command_smoke(&client).await,
        Commands::Contract(command) => command_contract(&client, &config, &command).await,
        Commands::Health(command) => command_health(&client, &command).await,
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Applies flags shared by every subcommand.
fn apply_global_overrides(config: HarnessConfig, cli: &Cli) -> CliResult<HarnessConfig> {
    let mut config = match &cli.base_url {
        Some(raw) => config
            .with_base_url(raw)
            .map_err(|err| CliError::new(format!("invalid --base-url: {err}")))?,
        None => config,
    };
    if let Some(raw) = &cli.event_log {
        config.event_log = Some(EventLogTarget::parse(raw));
    }
    Ok(config)
}

/// Applies `contract` flags.
fn apply_contract_overrides(mut config: HarnessConfig, command: &ContractCommand) -> HarnessConfig {
    if let Some(workers) = command.parallel {
        config.parallelism = Some(workers);
    }
    if let Some(dir) = &command.report_dir {
        config.run_root = Some(dir.clone());
    }
    config
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `smoke`.
async fn command_smoke(client: &PredictorClient) -> CliResult<ExitCode> {
    write_stderr_line("--- Kawsay Prediction Service Integration Test ---")?;
    write_stderr_line(&format!(
        "-> Preparing to send {} records to {}",
        smoke_request().records.len(),
        client.base_url()
    ))?;
    let response = match run_smoke(client).await {
        Ok(response) => response,
        Err(err) => return Ok(emit_error(&err.to_string())),
    };
    write_stderr_line("<- Received successful 200 OK response from API.")?;
    write_stdout_line(render_table(&response).trim_end())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `contract`.
async fn command_contract(
    client: &PredictorClient,
    config: &HarnessConfig,
    command: &ContractCommand,
) -> CliResult<ExitCode> {
    let mode = RunMode::from_config(config);
    let mut reports = Vec::new();
    for suite in command.suite.suites() {
        let runner = ScenarioRunner::new(client.clone()).with_suite_label(suite.as_str());
        let report = runner.run_suite(&suite.scenarios(), mode).await;
        if let Some(root) = &config.run_root {
            report
                .write_artifacts(&root.join(suite.as_str()))
                .map_err(|err| CliError::new(err.to_string()))?;
        }
        reports.push(report);
    }
    write_stdout_line(&render_reports(&reports, command.format)?)?;
    if reports.iter().all(SuiteReport::is_success) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Executes `health`.
async fn command_health(client: &PredictorClient, command: &HealthCommand) -> CliResult<ExitCode> {
    let result = match command.wait_secs {
        Some(secs) => {
            wait_for_ready(client, Duration::from_secs(secs)).await.map_err(|err| err.to_string())
        }
        None => probe_health(client).await,
    };
    match result {
        Ok(report) => {
            write_stdout_line(&format!(
                "status {} (model {})",
                report.status.as_str(),
                report.services.model.as_str()
            ))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(message) => Ok(emit_error(&message)),
    }
}

/// Renders suite reports in the requested format.
fn render_reports(reports: &[SuiteReport], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Text => {
            let rendered = reports.iter().map(SuiteReport::render_text).collect::<Vec<_>>();
            Ok(rendered.join("\n").trim_end().to_string())
        }
        OutputFormat::Json => serde_json::to_string_pretty(reports)
            .map_err(|err| CliError::new(format!("failed to serialize report: {err}"))),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}").map_err(|err| CliError::new(output_error("stderr", &err)))
}

/// Formats an output failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
