//! Command pipelines.
//!
//! Each command is a single linear pass: resolve inputs, query or ingest,
//! then render. Text output goes to a caller-supplied writer so the binary
//! can hand in stdout and tests can capture it.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use prom_window_report::app::run_analyze;
//! use prom_window_report::cli::AnalyzeArgs;
//! use prom_window_report::config::SecretString;
//! use prom_window_report::prometheus::{ClientConfig, PrometheusClient};
//! use prom_window_report::report::ReportRenderer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let args = AnalyzeArgs::default();
//! let client = PrometheusClient::new(
//!     SecretString::new("sha256~example-token"),
//!     ClientConfig::new("https://prometheus.example.com"),
//! )?;
//! let renderer = ReportRenderer::new("./results", "report");
//! let mut stdout = std::io::stdout();
//! run_analyze(client, &args, None, &renderer, Utc::now(), &mut stdout).await?;
//! # Ok(())
//! # }
//! ```

mod analyze;
mod combine;

pub use analyze::{run_analyze, AnalyzeSummary};
pub use combine::{run_combine, CombineSummary};

use std::io::Write;

use crate::error::RenderError;

/// Write report text, mapping failures to [`RenderError::Io`].
fn emit<W: Write>(out: &mut W, text: &str) -> Result<(), RenderError> {
    writeln!(out, "{text}").map_err(|e| RenderError::Io {
        path: "<output>".into(),
        message: e.to_string(),
    })
}
