//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (with optional `.env` file)
//! - Configuration validation
//! - Default value handling
//! - Secure bearer token storage via [`SecretString`]
//!
//! # Example
//!
//! ```
//! use prom_window_report::config::{Config, SecretString};
//!
//! // Create a config directly (use Config::from_env() in production)
//! let config = Config {
//!     prometheus_url: Some("https://prometheus.example.com".to_string()),
//!     token: Some(SecretString::new("sha256~example-token")),
//!     ..Config::default()
//! };
//!
//! let debug = format!("{:?}", config);
//! assert!(debug.contains("<REDACTED>"));
//! assert!(!debug.contains("sha256~example-token"));
//! ```

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{
    validate_backend, validate_config, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS, MIN_TOKEN_LENGTH,
};

use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default backend request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default directory for chart and CSV artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "./results";

/// Default artifact file-name prefix.
pub const DEFAULT_REPORT_PREFIX: &str = "report";

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment
/// variables. Backend settings are optional here because the `combine`
/// command never talks to the backend; [`Config::backend`] enforces them
/// for commands that do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prometheus base URL.
    pub prometheus_url: Option<String>,
    /// Bearer token (protected from logging via [`SecretString`]).
    pub token: Option<SecretString>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Per-call backend timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Accept self-signed TLS certificates.
    pub insecure_tls: bool,
    /// Directory for chart and CSV artifacts.
    pub output_dir: String,
    /// Prefix for artifact file names.
    pub report_prefix: String,
    /// TrueType font used for chart text.
    pub chart_font_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prometheus_url: None,
            token: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            insecure_tls: true,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            report_prefix: DEFAULT_REPORT_PREFIX.to_string(),
            chart_font_path: None,
        }
    }
}

/// Validated backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Prometheus base URL.
    pub url: String,
    /// Bearer token.
    pub token: SecretString,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
    /// Accept self-signed TLS certificates.
    pub insecure_tls: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `PROMETHEUS_URL`: backend base URL
    /// - `PROMETHEUS_TOKEN`: bearer token
    /// - `LOG_LEVEL`: logging level (default: `info`)
    /// - `REQUEST_TIMEOUT_MS`: per-call timeout (default: `30000`)
    /// - `PROMETHEUS_INSECURE_TLS`: accept self-signed certificates (default: `true`)
    /// - `OUTPUT_DIR`: artifact directory (default: `./results`)
    /// - `REPORT_PREFIX`: artifact prefix (default: `report`)
    /// - `CHART_FONT_PATH`: TrueType font for chart text
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value cannot be parsed or fails
    /// validation (see [`validate_config`]).
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let config = Self {
            prometheus_url: std::env::var("PROMETHEUS_URL").ok(),
            token: std::env::var("PROMETHEUS_TOKEN").ok().map(SecretString::new),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into()),
            request_timeout_ms: parse_env_u64("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?,
            insecure_tls: parse_env_bool("PROMETHEUS_INSECURE_TLS", true)?,
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.into()),
            report_prefix: std::env::var("REPORT_PREFIX")
                .unwrap_or_else(|_| DEFAULT_REPORT_PREFIX.into()),
            chart_font_path: std::env::var("CHART_FONT_PATH").ok(),
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Apply command line overrides for the backend URL and token.
    #[must_use]
    pub fn with_overrides(mut self, url: Option<String>, token: Option<String>) -> Self {
        if url.is_some() {
            self.prometheus_url = url;
        }
        if let Some(token) = token {
            self.token = Some(SecretString::new(token));
        }
        self
    }

    /// Tracing filter for `log_level`. A directive that does not parse
    /// falls back to [`DEFAULT_LOG_LEVEL`].
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    }

    /// Backend settings, required by commands that query Prometheus.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] when the URL or token is
    /// absent, or [`ConfigError::InvalidValue`] when either is malformed.
    pub fn backend(&self) -> Result<BackendSettings, ConfigError> {
        let url = self
            .prometheus_url
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "PROMETHEUS_URL".into(),
            })?;
        let token = self
            .token
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "PROMETHEUS_TOKEN".into(),
            })?;

        let settings = BackendSettings {
            url,
            token,
            timeout_ms: self.request_timeout_ms,
            insecure_tls: self.insecure_tls,
        };
        validate_backend(&settings)?;
        Ok(settings)
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as a boolean flag, using a default if not set.
fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        match val.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                var: name.into(),
                reason: "must be true or false".into(),
            }),
        }
    })
}
