//! Start-date and label-list arguments.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ConfigError;

/// Accepted `--date` format with a time of day.
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Accepted `--date` format without a time of day (midnight).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `DD/MM/YYYY HH:MM:SS` or `DD/MM/YYYY` start date as UTC.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for any other input.
pub fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT) {
        return Ok(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ConfigError::InvalidValue {
            var: "--date".into(),
            reason: format!("expected DD/MM/YYYY or DD/MM/YYYY HH:MM:SS, got '{raw}'"),
        })
}

/// Split a comma-separated label list, trimming each entry.
#[must_use]
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',').map(|label| label.trim().to_string()).collect()
}
