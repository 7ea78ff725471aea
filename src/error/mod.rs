//! Error types for the windowed report pipeline.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`BackendError`]: Metrics backend (Prometheus API) errors
//! - [`ConfigError`]: Configuration errors, fatal before any backend call
//! - [`RenderError`]: Chart and artifact rendering errors
//!
//! Row-level ingestion problems and empty query results are *not* errors;
//! they are reported as data (see [`crate::ingest::SkipReason`] and
//! [`ErrorInfo`]).
//!
//! All errors implement `Send + Sync`.

mod diagnostic;

pub use diagnostic::{ErrorCategory, ErrorInfo};

use thiserror::Error;

use crate::cli::CommandParseError;

/// Top-level application error.
///
/// This is the error type returned by the binary's command handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Metrics backend error.
    #[error("Metrics backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Command line error.
    #[error("Command line error: {0}")]
    Cli(#[from] CommandParseError),
}

/// Metrics backend errors.
///
/// These errors represent failures when communicating with the backend.
/// The orchestrator converts them into [`ErrorInfo`] per window so a single
/// failed call never halts the remaining windows or metrics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Authentication failed due to an invalid or expired token.
    #[error("Authentication failed: invalid or expired bearer token")]
    AuthenticationFailed,

    /// Request timed out.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Network communication error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// The backend rejected the query expression or its parameters.
    #[error("Query rejected ({error_type}): {message}")]
    QueryRejected {
        /// Backend error class (e.g. `bad_data`).
        error_type: String,
        /// Backend error message.
        message: String,
    },

    /// Unexpected response from the backend.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Description of what was unexpected.
        message: String,
    },
}

impl BackendError {
    /// Category used to pick recovery suggestions.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationFailed => ErrorCategory::Authentication,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Network { .. } => ErrorCategory::Network,
            Self::QueryRejected { .. } => ErrorCategory::InvalidQuery,
            Self::UnexpectedResponse { .. } => ErrorCategory::Other,
        }
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation,
/// including invalid command line values such as dates and day labels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}

/// Rendering errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Writing an artifact failed.
    #[error("Failed to write {path}: {message}")]
    Io {
        /// Artifact path.
        path: String,
        /// Underlying I/O error.
        message: String,
    },

    /// The charting backend failed.
    #[error("Chart drawing failed: {message}")]
    Chart {
        /// Description of the drawing failure.
        message: String,
    },

    /// No usable font was found for chart text.
    #[error("No usable font found; set CHART_FONT_PATH to a TrueType font")]
    FontUnavailable,

    /// There are no samples to render.
    #[error("No data to render")]
    NoData,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(AppError: Send, Sync, std::error::Error);
    assert_impl_all!(BackendError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(ConfigError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(RenderError: Send, Sync, std::error::Error, Clone);

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Timeout { timeout_ms: 30_000 };
        assert_eq!(err.to_string(), "Request timeout after 30000ms");

        let err = BackendError::QueryRejected {
            error_type: "bad_data".into(),
            message: "parse error".into(),
        };
        assert_eq!(err.to_string(), "Query rejected (bad_data): parse error");
    }

    #[test]
    fn test_backend_error_category() {
        assert_eq!(
            BackendError::AuthenticationFailed.category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            BackendError::Network {
                message: "refused".into()
            }
            .category(),
            ErrorCategory::Network
        );
        assert_eq!(
            BackendError::UnexpectedResponse {
                message: "502".into()
            }
            .category(),
            ErrorCategory::Other
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            var: "--day-labels".into(),
            reason: "expected 3 labels, got 2".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for --day-labels: expected 3 labels, got 2"
        );
    }

    #[test]
    fn test_app_error_from_config() {
        let err: AppError = ConfigError::MissingRequired {
            var: "PROMETHEUS_URL".into(),
        }
        .into();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required: PROMETHEUS_URL"
        );
    }

    #[test]
    fn test_app_error_from_render() {
        let err: AppError = RenderError::FontUnavailable.into();
        assert!(err.to_string().starts_with("Render error:"));
    }
}
