//! prom-window-report binary entry point.
//!
//! All logs go to stderr; stdout carries only the report text so it can be
//! redirected to a file.
//!
//! Coverage is excluded because the entry point needs a live backend or
//! real files and only wires library calls together.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::process::ExitCode;

use chrono::Utc;
use prom_window_report::app::{run_analyze, run_combine};
use prom_window_report::cli::{help_text, AnalyzeArgs, CombineArgs, Command};
use prom_window_report::config::{Config, DEFAULT_LOG_LEVEL};
use prom_window_report::error::{AppError, ConfigError};
use prom_window_report::prometheus::PrometheusClient;
use prom_window_report::report::ReportRenderer;

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Configuration errors surface only for commands that need it; the
    // logger still starts at the default level.
    let config = Config::from_env();
    let filter = config.as_ref().map_or_else(
        |_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_LEVEL),
        Config::log_filter,
    );

    // Initialize logging to stderr only (stdout is for the report)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn run(args: &[String], config: Result<Config, ConfigError>) -> Result<(), AppError> {
    match Command::parse(args)? {
        Command::Help => {
            println!("{}", help_text());
            Ok(())
        }
        Command::Analyze(analyze_args) => analyze(&analyze_args, config).await,
        Command::Combine(combine_args) => combine(&combine_args, config),
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn analyze(args: &AnalyzeArgs, config: Result<Config, ConfigError>) -> Result<(), AppError> {
    // Dates and labels are checked before any backend call.
    let plan = args.window_plan()?;
    let config = config?.with_overrides(args.url.clone(), args.token.clone());
    let settings = config.backend()?;

    tracing::info!(
        url = %settings.url,
        token = %settings.token.preview(),
        timeout_ms = settings.timeout_ms,
        "Configuration loaded"
    );

    let client = PrometheusClient::from_settings(&settings)?;
    let renderer = ReportRenderer::from_config(&config);
    let mut stdout = std::io::stdout().lock();
    let summary =
        run_analyze(client, args, plan.as_ref(), &renderer, Utc::now(), &mut stdout).await?;

    tracing::info!(
        metrics = summary.metrics,
        without_data = summary.metrics_without_data,
        artifacts = summary.artifacts.len(),
        "Analysis complete"
    );
    Ok(())
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn combine(args: &CombineArgs, config: Result<Config, ConfigError>) -> Result<(), AppError> {
    let start = args.start()?;
    let config = config?;
    let renderer = ReportRenderer::from_config(&config);
    let mut stdout = std::io::stdout().lock();
    let summary = run_combine(args, start, &renderer, &mut stdout)?;

    tracing::info!(
        unique = summary.dedup.unique,
        duplicates_removed = summary.dedup.duplicates_removed,
        chart = summary.chart.is_some(),
        "Combine complete"
    );
    Ok(())
}
