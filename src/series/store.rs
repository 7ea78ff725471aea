//! Deduplicating, order-preserving sample container.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{DedupStats, MetricSeries, Sample, UnitKind, UNKNOWN_METRIC};

/// Accumulates samples for one metric, keeping the last value written for
/// each timestamp.
///
/// Every ingestion call takes the store explicitly; there is no shared
/// accumulation state between calls.
#[derive(Debug, Clone)]
pub struct SampleStore {
    metric_name: Option<String>,
    unit: Option<String>,
    unit_kind: UnitKind,
    samples: BTreeMap<DateTime<Utc>, f64>,
    inserted: usize,
}

impl SampleStore {
    /// Create a store with a known name and unit kind.
    #[must_use]
    pub fn new(metric_name: impl Into<String>, unit_kind: UnitKind) -> Self {
        Self {
            metric_name: Some(metric_name.into()),
            unit: None,
            unit_kind,
            samples: BTreeMap::new(),
            inserted: 0,
        }
    }

    /// Create a store whose name and unit are learned from the input.
    #[must_use]
    pub fn unnamed() -> Self {
        Self {
            metric_name: None,
            unit: None,
            unit_kind: UnitKind::default(),
            samples: BTreeMap::new(),
            inserted: 0,
        }
    }

    /// Insert or overwrite the value at `timestamp`.
    ///
    /// Returns true when an existing sample was overwritten.
    pub fn insert(&mut self, timestamp: DateTime<Utc>, value: f64) -> bool {
        self.inserted += 1;
        self.samples.insert(timestamp, value).is_some()
    }

    /// Record the display name unless one is already set.
    pub fn set_metric_name_once(&mut self, name: &str) {
        let name = name.trim();
        if self.metric_name.is_none() && !name.is_empty() {
            self.metric_name = Some(name.to_string());
        }
    }

    /// Record the unit label unless one is already set.
    pub fn set_unit_once(&mut self, unit: &str) {
        let unit = unit.trim();
        if self.unit.is_none() && !unit.is_empty() {
            self.unit = Some(unit.to_string());
        }
    }

    /// Record the unit kind if it is still the default.
    pub fn set_unit_kind_once(&mut self, kind: UnitKind) {
        if self.unit_kind == UnitKind::default() {
            self.unit_kind = kind;
        }
    }

    /// Number of insertions so far, including overwrites.
    #[must_use]
    pub const fn inserted(&self) -> usize {
        self.inserted
    }

    /// Number of distinct timestamps held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples have been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Materialize the ascending, deduplicated series.
    ///
    /// Idempotent: the store is not consumed or modified.
    #[must_use]
    pub fn finalize(&self) -> MetricSeries {
        let samples: Vec<Sample> = self
            .samples
            .iter()
            .map(|(timestamp, value)| Sample::new(*timestamp, *value))
            .collect();
        let unique = samples.len();

        MetricSeries {
            metric_name: self
                .metric_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_METRIC.to_string()),
            unit: self
                .unit
                .clone()
                .unwrap_or_else(|| self.unit_kind.label().to_string()),
            unit_kind: self.unit_kind,
            samples,
            dedup: DedupStats {
                inserted: self.inserted,
                unique,
                duplicates_removed: self.inserted.saturating_sub(unique),
            },
        }
    }
}
