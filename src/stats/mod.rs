//! Summary statistics and unit-aware formatting.
//!
//! # Example
//!
//! ```
//! use prom_window_report::stats::SeriesStats;
//!
//! let stats = SeriesStats::from_values(&[10.0, 20.0, 30.0]).unwrap();
//! assert_eq!(stats.count, 3);
//! assert!((stats.mean - 20.0).abs() < f64::EPSILON);
//! assert!((stats.growth_percent - 200.0).abs() < f64::EPSILON);
//!
//! // A zero first value never divides by zero.
//! let flat = SeriesStats::from_values(&[0.0, 5.0]).unwrap();
//! assert_eq!(flat.growth_percent, 0.0);
//! ```

// Sample counts never approach 2^52.
#![allow(clippy::cast_precision_loss)]

mod format;

pub use format::{format_bytes, format_raw, format_value, AxisScale, BINARY_UNITS};

use serde::Serialize;

use crate::series::Sample;

/// Count, extremes, mean, and first-to-last growth of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    /// Number of values.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// First value in order.
    pub first: f64,
    /// Last value in order.
    pub last: f64,
    /// `(last - first) / first * 100`, or 0 when `first` is 0.
    pub growth_percent: f64,
}

impl SeriesStats {
    /// Statistics over ordered values; `None` when empty.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first, &last) = (values.first()?, values.last()?);

        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );

        Some(Self {
            count: values.len(),
            min,
            max,
            mean: sum / values.len() as f64,
            first,
            last,
            growth_percent: growth_percent(first, last),
        })
    }

    /// Statistics over time-ordered samples; `None` when empty.
    #[must_use]
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        Self::from_values(&values)
    }
}

/// Percentage change from `first` to `last`; 0 when `first` is 0.
#[must_use]
pub fn growth_percent(first: f64, last: f64) -> f64 {
    if first == 0.0 {
        return 0.0;
    }
    (last - first) / first * 100.0
}
