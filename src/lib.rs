//! Prometheus Window Report
//!
//! Windowed time-series aggregation and reporting over Prometheus range
//! queries and CSV exports.
//!
//! # Features
//!
//! - Consecutive fixed-length windows from a user-supplied start instant
//! - Per-window range queries plus one hourly coverage query per metric
//! - Timestamp-deduplicated merging of CSV exports
//! - Grid tables, annotated PNG charts, and CSV exports with shared statistics
//! - Structured "no data" diagnostics with suggestions
//!
//! # Quick Start
//!
//! ```bash
//! PROMETHEUS_URL=https://prometheus-k8s.apps.example.com \
//! PROMETHEUS_TOKEN="$(oc whoami -t)" \
//!   ./prom-window-report analyze --date "15/01/2024 00:00:00" --days 3
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   windows   ┌──────────────┐  range queries  ┌────────────┐
//! │   CLI    │────────────▶│ Orchestrator │────────────────▶│ Prometheus │
//! └──────────┘             └──────┬───────┘                 └────────────┘
//!      │ CSV files                │ MetricSeries
//!      ▼                          ▼
//! ┌──────────┐  SampleStore ┌──────────────┐
//! │ Ingestor │─────────────▶│   Reports    │──▶ table / PNG / CSV
//! └──────────┘              └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod prometheus;
pub mod query;
pub mod report;
pub mod series;
pub mod stats;
pub mod traits;
pub mod window;

#[cfg(test)]
mod test_utils;
