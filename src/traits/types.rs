//! Shared query types exchanged with a [`super::MetricsBackend`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorInfo;
use crate::window::TimeWindow;

/// A range query over one half-open window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    /// Query expression; `{range}` is replaced by the range selector.
    pub expression: String,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    /// Evaluation step in hours.
    pub step_hours: u32,
    /// Range selector width in hours.
    pub range_hours: u32,
    /// Ask the backend to flag results that only partially cover the window.
    pub filter_incomplete: bool,
}

impl RangeQuery {
    /// Create a range query covering `window`.
    #[must_use]
    pub fn for_window(expression: impl Into<String>, window: &TimeWindow) -> Self {
        Self {
            expression: expression.into(),
            start: window.start,
            end: window.end,
            step_hours: 1,
            range_hours: 1,
            filter_incomplete: false,
        }
    }

    /// Set the evaluation step.
    #[must_use]
    pub const fn with_step_hours(mut self, step_hours: u32) -> Self {
        self.step_hours = step_hours;
        self
    }

    /// Set the range selector width.
    #[must_use]
    pub const fn with_range_hours(mut self, range_hours: u32) -> Self {
        self.range_hours = range_hours;
        self
    }

    /// Enable or disable incomplete-window flagging.
    #[must_use]
    pub const fn with_filter_incomplete(mut self, filter_incomplete: bool) -> Self {
        self.filter_incomplete = filter_incomplete;
        self
    }

    /// Expression with the `{range}` placeholder substituted.
    #[must_use]
    pub fn rendered_expression(&self) -> String {
        self.expression
            .replace("{range}", &format!("{}h", self.range_hours))
    }
}

/// Outcome status reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// The query was evaluated.
    Success,
    /// The query failed.
    Error,
}

/// One raw point as returned by the backend: unix seconds and a
/// string-encoded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint(pub f64, pub String);

/// One labelled series of raw points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSeries {
    /// Series labels (`__name__`, `namespace`, ...).
    pub labels: BTreeMap<String, String>,
    /// Points in backend order.
    pub values: Vec<RawPoint>,
}

/// Result of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Backend status.
    pub status: QueryStatus,
    /// Returned series; empty when the query matched nothing.
    pub series: Vec<RawSeries>,
    /// Diagnostic supplied by the backend for empty results.
    pub error_info: Option<ErrorInfo>,
    /// Non-fatal backend warnings.
    pub warnings: Vec<String>,
    /// The data only partially covers the requested window.
    pub incomplete: bool,
}

impl QueryResult {
    /// A successful result holding `series`.
    #[must_use]
    pub const fn success(series: Vec<RawSeries>) -> Self {
        Self {
            status: QueryStatus::Success,
            series,
            error_info: None,
            warnings: Vec::new(),
            incomplete: false,
        }
    }

    /// A successful result with no series.
    #[must_use]
    pub const fn empty() -> Self {
        Self::success(Vec::new())
    }

    /// Returns true if no series were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.values.is_empty())
    }

    /// Total number of raw points across all series.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.values.len()).sum()
    }
}
