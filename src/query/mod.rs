//! Per-metric, per-window backend queries.
//!
//! [`MetricQueryOrchestrator`] runs every metric against the same
//! [`WindowPlan`]: one call per daily window (step = window length) and one
//! call across the coverage window at 1-hour step and range. Calls are
//! issued sequentially and never retried. A failed or empty call becomes an
//! [`ErrorInfo`] for that window only; the run continues.

mod profiles;

pub use profiles::{
    bucket_usage, hub_metrics, namespace_metrics, spoke_metrics, MetricSpec, Profile,
    DEFAULT_BUCKET, HUB_NAMESPACE, RANGE_PLACEHOLDER, SPOKE_NAMESPACE,
};

use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::ErrorInfo;
use crate::ingest::ingest_query_result;
use crate::series::{MetricSeries, SampleStore};
use crate::traits::{MetricsBackend, QueryResult, RangeQuery};
use crate::window::{TimeWindow, WindowPlan};

/// Step and range used for the coverage window, in hours.
pub const COVERAGE_STEP_HOURS: u32 = 1;

/// Look-back of the current-usage query, in hours.
pub const CURRENT_USAGE_HOURS: u32 = 24;

/// What one window produced.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    /// At least one sample.
    Data(MetricSeries),
    /// The query succeeded but matched nothing.
    Empty(ErrorInfo),
    /// The backend call failed.
    Failed(ErrorInfo),
}

impl WindowOutcome {
    /// The series, if any.
    #[must_use]
    pub const fn series(&self) -> Option<&MetricSeries> {
        match self {
            Self::Data(series) => Some(series),
            Self::Empty(_) | Self::Failed(_) => None,
        }
    }

    /// The diagnostic, if the window has no data.
    #[must_use]
    pub const fn error_info(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Data(_) => None,
            Self::Empty(info) | Self::Failed(info) => Some(info),
        }
    }
}

/// One metric's outcome for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedResult {
    /// The window queried.
    pub window: TimeWindow,
    /// Series or diagnostic.
    pub outcome: WindowOutcome,
}

/// Everything collected for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    /// The metric queried.
    pub metric: MetricSpec,
    /// One result per kept daily window, in window order.
    pub daily: Vec<WindowedResult>,
    /// Hourly coverage result; `None` when dropped as incomplete.
    pub coverage: Option<WindowedResult>,
    /// Labels of windows dropped as incomplete.
    pub dropped: Vec<String>,
}

impl MetricReport {
    /// Returns true if no window produced any sample.
    #[must_use]
    pub fn has_no_data(&self) -> bool {
        self.daily
            .iter()
            .chain(self.coverage.iter())
            .all(|r| r.outcome.series().is_none())
    }
}

/// Queries a [`MetricsBackend`] for each metric and window.
#[derive(Debug)]
pub struct MetricQueryOrchestrator<B: MetricsBackend> {
    backend: B,
    filter_incomplete: bool,
}

impl<B: MetricsBackend> MetricQueryOrchestrator<B> {
    /// Create an orchestrator over `backend`.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            filter_incomplete: false,
        }
    }

    /// Drop windows the backend flags as partially outside retention.
    #[must_use]
    pub const fn with_filter_incomplete(mut self, filter_incomplete: bool) -> Self {
        self.filter_incomplete = filter_incomplete;
        self
    }

    /// The wrapped backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Run every metric against the shared plan, in order.
    pub async fn run(&self, metrics: &[MetricSpec], plan: &WindowPlan) -> Vec<MetricReport> {
        let mut reports = Vec::with_capacity(metrics.len());
        for metric in metrics {
            reports.push(self.run_metric(metric, plan).await);
        }
        reports
    }

    /// Query each daily window, then the coverage window, for one metric.
    pub async fn run_metric(&self, metric: &MetricSpec, plan: &WindowPlan) -> MetricReport {
        let mut daily = Vec::with_capacity(plan.len());
        let mut dropped = Vec::new();

        for window in plan.windows() {
            let query = RangeQuery::for_window(&metric.expression, window)
                .with_step_hours(plan.length_hours())
                .with_range_hours(metric.range_hours)
                .with_filter_incomplete(self.filter_incomplete);
            match self.query_window(metric, window, &query).await {
                Some(result) => daily.push(result),
                None => dropped.push(window.label.clone()),
            }
        }

        let coverage_window = plan.coverage();
        let query = RangeQuery::for_window(&metric.expression, coverage_window)
            .with_step_hours(COVERAGE_STEP_HOURS)
            .with_range_hours(COVERAGE_STEP_HOURS)
            .with_filter_incomplete(self.filter_incomplete);
        let coverage = self.query_window(metric, coverage_window, &query).await;
        if coverage.is_none() {
            dropped.push(coverage_window.label.clone());
        }

        MetricReport {
            metric: metric.clone(),
            daily,
            coverage,
            dropped,
        }
    }

    /// Average over the last [`CURRENT_USAGE_HOURS`] ending at `now`, as a
    /// single instant query.
    pub async fn current_usage(&self, metric: &MetricSpec, now: DateTime<Utc>) -> WindowedResult {
        let start = now - TimeDelta::hours(i64::from(CURRENT_USAGE_HOURS));
        let window = TimeWindow::new(0, start, now, format!("Last {CURRENT_USAGE_HOURS}h"));
        let expression = metric.expression_for_range(CURRENT_USAGE_HOURS);

        let started = Instant::now();
        let outcome = match self.backend.query_instant(&expression).await {
            Ok(result) => {
                tracing::info!(
                    metric = %metric.name,
                    points = result.point_count(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Instant query completed"
                );
                Self::outcome_from(metric, &window, &result)
            }
            Err(e) => {
                tracing::warn!(metric = %metric.name, error = %e, "Instant query failed");
                WindowOutcome::Failed(ErrorInfo::from_backend_error(&e, expression))
            }
        };

        WindowedResult { window, outcome }
    }

    /// Issue one range query. `None` means the window was dropped.
    async fn query_window(
        &self,
        metric: &MetricSpec,
        window: &TimeWindow,
        query: &RangeQuery,
    ) -> Option<WindowedResult> {
        let started = Instant::now();
        let outcome = match self.backend.query_range(query).await {
            Ok(result) if self.filter_incomplete && result.incomplete => {
                tracing::info!(
                    metric = %metric.name,
                    window = %window.label,
                    "Dropping window partially outside retention"
                );
                return None;
            }
            Ok(result) => {
                tracing::info!(
                    metric = %metric.name,
                    window = %window.label,
                    step_hours = query.step_hours,
                    points = result.point_count(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Range query completed"
                );
                for warning in &result.warnings {
                    tracing::warn!(metric = %metric.name, warning = %warning, "Backend warning");
                }
                Self::outcome_from(metric, window, &result)
            }
            Err(e) => {
                tracing::warn!(
                    metric = %metric.name,
                    window = %window.label,
                    error = %e,
                    "Range query failed"
                );
                WindowOutcome::Failed(ErrorInfo::from_backend_error(&e, window.range_text()))
            }
        };

        Some(WindowedResult {
            window: window.clone(),
            outcome,
        })
    }

    fn outcome_from(metric: &MetricSpec, window: &TimeWindow, result: &QueryResult) -> WindowOutcome {
        let mut store = SampleStore::new(metric.name.clone(), metric.unit_kind);
        ingest_query_result(&mut store, result);

        if store.is_empty() {
            let info = result.error_info.clone().unwrap_or_else(|| {
                ErrorInfo::no_data(&metric.name, window.range_text(), &metric.suggestions)
            });
            return WindowOutcome::Empty(info);
        }
        WindowOutcome::Data(store.finalize())
    }
}
