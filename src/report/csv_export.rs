//! CSV export of a finalized series.
//!
//! The output uses the column layout the file ingestor
//! accepts, so an export can be fed back into `combine`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::RenderError;
use crate::ingest::{ValueField, TIMESTAMP_FORMAT};
use crate::series::MetricSeries;

fn io_error(path: &str, e: impl std::fmt::Display) -> RenderError {
    RenderError::Io {
        path: path.to_string(),
        message: e.to_string(),
    }
}

/// Write `series` as `timestamp,metric_name,<value column>` rows, in sample
/// order. The value column is named after the series unit kind
/// (`value_bytes`, `value_seconds`, ...) so re-ingesting restores it.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if writing fails; `target` names the
/// destination in the error.
pub fn write_series<W: Write>(writer: W, series: &MetricSeries, target: &str) -> Result<(), RenderError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let value_column = ValueField::column_for(series.unit_kind);
    wtr.write_record(["timestamp", "metric_name", value_column])
        .map_err(|e| io_error(target, e))?;

    for sample in &series.samples {
        let timestamp = sample.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let value = sample.value.to_string();
        wtr.write_record([timestamp.as_str(), series.metric_name.as_str(), value.as_str()])
            .map_err(|e| io_error(target, e))?;
    }

    wtr.flush().map_err(|e| io_error(target, e))
}

/// Write `series` to a new file at `path`.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if the file cannot be created or written.
pub fn export_csv(path: &Path, series: &MetricSeries) -> Result<(), RenderError> {
    let target = path.display().to_string();
    let file = File::create(path).map_err(|e| io_error(&target, e))?;
    write_series(file, series, &target)?;
    tracing::info!(path = %target, rows = series.samples.len(), "CSV export written");
    Ok(())
}
