//! Backend query results.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::series::SampleStore;
use crate::traits::{QueryResult, RawPoint};

/// Counts from ingesting one [`QueryResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendIngestSummary {
    /// Points accepted into the store.
    pub points: usize,
    /// Points with an unusable timestamp or value.
    pub skipped: usize,
}

fn convert(point: &RawPoint) -> Option<(DateTime<Utc>, f64)> {
    let RawPoint(seconds, raw) = point;
    if !seconds.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let millis = (seconds * 1000.0).round() as i64;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(millis)?;
    let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((timestamp, value))
}

/// Insert every point of every series in `result` into `store`.
///
/// Series are merged; points sharing a timestamp resolve last-write-wins.
/// The store's name is taken from the `__name__` label when it has none.
pub fn ingest_query_result(store: &mut SampleStore, result: &QueryResult) -> BackendIngestSummary {
    let mut summary = BackendIngestSummary::default();

    for series in &result.series {
        if let Some(name) = series.labels.get("__name__") {
            store.set_metric_name_once(name);
        }
        for point in &series.values {
            match convert(point) {
                Some((timestamp, value)) => {
                    store.insert(timestamp, value);
                    summary.points += 1;
                }
                None => {
                    tracing::warn!(timestamp = point.0, value = %point.1, "Skipping invalid point");
                    summary.skipped += 1;
                }
            }
        }
    }

    summary
}
