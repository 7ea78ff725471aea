//! Configuration validation.
//!
//! This module provides validation logic for configuration values,
//! ensuring they are within acceptable ranges.

use super::{BackendSettings, Config};
use crate::error::ConfigError;

/// Minimum allowed timeout in milliseconds (1 second).
pub const MIN_TIMEOUT_MS: u64 = 1000;

/// Maximum allowed timeout in milliseconds (5 minutes).
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Shortest bearer token accepted. Cluster tokens are much longer.
pub const MIN_TOKEN_LENGTH: usize = 10;

/// Validate general configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `REQUEST_TIMEOUT_MS` must be between 1000 and 300000
/// - `OUTPUT_DIR` and `REPORT_PREFIX` must not be empty
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.request_timeout_ms < MIN_TIMEOUT_MS || config.request_timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::InvalidValue {
            var: "REQUEST_TIMEOUT_MS".into(),
            reason: format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} ms"),
        });
    }

    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "OUTPUT_DIR".into(),
            reason: "must not be empty".into(),
        });
    }

    if config.report_prefix.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "REPORT_PREFIX".into(),
            reason: "must not be empty".into(),
        });
    }

    Ok(())
}

/// Validate backend connection settings.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if:
/// - the URL does not start with `http://` or `https://`
/// - the token is shorter than [`MIN_TOKEN_LENGTH`]
#[must_use = "validation result should be checked"]
pub fn validate_backend(settings: &BackendSettings) -> Result<(), ConfigError> {
    if !settings.url.starts_with("http://") && !settings.url.starts_with("https://") {
        return Err(ConfigError::InvalidValue {
            var: "PROMETHEUS_URL".into(),
            reason: format!("must start with http:// or https:// (got {})", settings.url),
        });
    }

    if settings.token.len() < MIN_TOKEN_LENGTH {
        return Err(ConfigError::InvalidValue {
            var: "PROMETHEUS_TOKEN".into(),
            reason: "appears to be too short".into(),
        });
    }

    Ok(())
}
