//! Prometheus implementation of [`MetricsBackend`](crate::traits::MetricsBackend).
//!
//! This module provides:
//! - A bearer-token HTTP client for the Prometheus query API
//! - Range and instant queries, plus a connectivity probe
//! - Status mapping onto [`BackendError`](crate::error::BackendError)
//!
//! # Example
//!
//! ```no_run
//! use prom_window_report::config::SecretString;
//! use prom_window_report::prometheus::{ClientConfig, PrometheusClient};
//! use prom_window_report::traits::MetricsBackend;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://prometheus.example.com").with_insecure_tls(true);
//! let client = PrometheusClient::new(SecretString::new("sha256~token"), config)?;
//! assert!(client.check_connection().await);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod types;

pub use client::PrometheusClient;
pub use config::{ClientConfig, CONNECTION_PROBE, QUERY_PATH, QUERY_RANGE_PATH};
pub use types::{ApiData, ApiResponse, MatrixSeries, VectorSample};
