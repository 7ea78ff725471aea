//! Deterministic artifact file names.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Timestamp format used inside file names (no `:`).
pub const FILE_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Replace characters that are awkward in file names with `_`.
#[must_use]
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// `{prefix}_{metric}_{start}_to_{end}.{extension}`.
#[must_use]
pub fn artifact_file_name(
    prefix: &str,
    metric_name: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    extension: &str,
) -> String {
    format!(
        "{}_{}_{}_to_{}.{extension}",
        sanitize_component(prefix),
        sanitize_component(metric_name),
        start.format(FILE_TIME_FORMAT),
        end.format(FILE_TIME_FORMAT),
    )
}

/// [`artifact_file_name`] joined onto `dir`.
#[must_use]
pub fn artifact_path(
    dir: &Path,
    prefix: &str,
    metric_name: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    extension: &str,
) -> PathBuf {
    dir.join(artifact_file_name(prefix, metric_name, start, end, extension))
}
