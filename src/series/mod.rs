//! Samples, materialized series, and the deduplicating sample store.
//!
//! A [`SampleStore`] is created per metric per run, filled once by the
//! ingestion layer, then finalized into an immutable [`MetricSeries`]:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use prom_window_report::series::{SampleStore, UnitKind};
//!
//! let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let mut store = SampleStore::new("bucket usage", UnitKind::Bytes);
//! store.insert(t, 10.0);
//! store.insert(t, 20.0);
//!
//! let series = store.finalize();
//! assert_eq!(series.samples.len(), 1);
//! assert_eq!(series.samples[0].value, 20.0);
//! assert_eq!(series.dedup.duplicates_removed, 1);
//! ```

mod store;

pub use store::SampleStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when no source supplies one.
pub const UNKNOWN_METRIC: &str = "Unknown Metric";

/// One (timestamp, value) observation of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation instant.
    pub timestamp: DateTime<Utc>,
    /// Observed value.
    pub value: f64,
}

impl Sample {
    /// Create a new sample.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Kind of quantity a series measures; drives formatting and axis scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Bytes, scaled with binary (1024-based) prefixes.
    Bytes,
    /// Bytes per second.
    BytesPerSecond,
    /// CPU seconds per second (cores).
    CpuSeconds,
    /// Plain count or unitless value.
    #[default]
    GenericCount,
    /// Percentage (0-100).
    Percentage,
}

impl UnitKind {
    /// Short unit label for axis titles and table headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bytes => "bytes",
            Self::BytesPerSecond => "bytes/s",
            Self::CpuSeconds => "cores",
            Self::GenericCount => "",
            Self::Percentage => "%",
        }
    }
}

/// Counts of inserted versus unique samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupStats {
    /// Successful insertions, including overwrites.
    pub inserted: usize,
    /// Distinct timestamps kept.
    pub unique: usize,
    /// Insertions that overwrote an existing timestamp.
    pub duplicates_removed: usize,
}

/// Finalized, read-only view of one metric's samples.
///
/// Samples are strictly ascending by timestamp with no repeated timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Display name.
    pub metric_name: String,
    /// Unit label as supplied by the source, or derived from `unit_kind`.
    pub unit: String,
    /// Quantity kind.
    pub unit_kind: UnitKind,
    /// Ordered samples.
    pub samples: Vec<Sample>,
    /// Dedup diagnostics.
    pub dedup: DedupStats,
}

impl MetricSeries {
    /// Returns true if the series holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Values in timestamp order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// First and last timestamps, if any.
    #[must_use]
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unit_labels() {
        assert_eq!(UnitKind::Bytes.label(), "bytes");
        assert_eq!(UnitKind::CpuSeconds.label(), "cores");
        assert_eq!(UnitKind::default(), UnitKind::GenericCount);
    }

    #[test]
    fn test_unit_kind_serde_snake_case() {
        let json = serde_json::to_string(&UnitKind::BytesPerSecond).unwrap();
        assert_eq!(json, "\"bytes_per_second\"");
    }

    #[test]
    fn test_time_span() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let mut store = SampleStore::new("m", UnitKind::GenericCount);
        store.insert(t1, 2.0);
        store.insert(t0, 1.0);
        let series = store.finalize();
        assert_eq!(series.time_span(), Some((t0, t1)));
        assert_eq!(series.values(), vec![1.0, 2.0]);
    }
}
