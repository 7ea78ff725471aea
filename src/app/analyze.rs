//! The `analyze` command.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::emit;
use crate::cli::AnalyzeArgs;
use crate::error::{AppError, BackendError, RenderError};
use crate::query::{MetricQueryOrchestrator, MetricReport, WindowedResult};
use crate::report::{ChartRequest, ReportRenderer};
use crate::series::{MetricSeries, SampleStore};
use crate::traits::MetricsBackend;
use crate::window::{WindowPlan, LABEL_TIME_FORMAT};

/// What an `analyze` run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzeSummary {
    /// Metrics reported.
    pub metrics: usize,
    /// Metrics for which no window returned data.
    pub metrics_without_data: usize,
    /// Charts and CSV files written.
    pub artifacts: Vec<PathBuf>,
}

/// Run the `analyze` command against `backend`.
///
/// With a plan, every metric is queried over the plan's daily windows and
/// coverage window; without one, a single current-usage query ending at
/// `now` runs per metric. Per-window failures appear in the report; only a
/// failed connection check or an unwritable output aborts the run.
///
/// # Errors
///
/// Returns [`AppError::Backend`] when the connection check fails, and
/// [`AppError::Render`] when report text cannot be written.
pub async fn run_analyze<B: MetricsBackend, W: Write>(
    backend: B,
    args: &AnalyzeArgs,
    plan: Option<&WindowPlan>,
    renderer: &ReportRenderer,
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<AnalyzeSummary, AppError> {
    if !backend.check_connection().await {
        return Err(BackendError::Network {
            message: "connection check failed; verify the URL, the token, and network access"
                .into(),
        }
        .into());
    }
    tracing::info!("Backend connection verified");

    let metrics = args.metrics();
    let orchestrator =
        MetricQueryOrchestrator::new(backend).with_filter_incomplete(args.filter_incomplete);
    let mut summary = AnalyzeSummary {
        metrics: metrics.len(),
        ..AnalyzeSummary::default()
    };

    match plan {
        Some(plan) => {
            tracing::info!(
                metrics = metrics.len(),
                windows = plan.len(),
                start = %plan.start(),
                "Running windowed analysis"
            );
            for report in orchestrator.run(&metrics, plan).await {
                if report.has_no_data() {
                    summary.metrics_without_data += 1;
                }
                emit_windowed(&report, plan, renderer, args.csv, out, &mut summary)?;
            }
        }
        None => {
            tracing::info!(metrics = metrics.len(), "Running current-usage analysis");
            for metric in &metrics {
                let result = orchestrator.current_usage(metric, now).await;
                if result.outcome.series().is_none() {
                    summary.metrics_without_data += 1;
                }
                emit_current(&metric.name, &result, renderer, args.csv, out, &mut summary)?;
            }
        }
    }

    Ok(summary)
}

fn emit_windowed<W: Write>(
    report: &MetricReport,
    plan: &WindowPlan,
    renderer: &ReportRenderer,
    csv: bool,
    out: &mut W,
    summary: &mut AnalyzeSummary,
) -> Result<(), RenderError> {
    let name = &report.metric.name;
    let title = format!(
        "{name}: {} x {}h from {}",
        plan.len(),
        plan.length_hours(),
        plan.start().format(LABEL_TIME_FORMAT)
    );
    emit(out, &renderer.table(&title, &report.daily))?;
    if !report.dropped.is_empty() {
        emit(
            out,
            &format!("Dropped as incomplete: {}", report.dropped.join(", ")),
        )?;
    }

    // The hourly coverage series gives the chart its detail; fall back to
    // the daily points when coverage was dropped or empty.
    let coverage = report
        .coverage
        .as_ref()
        .and_then(|c| c.outcome.series().map(|series| (c, series)));
    let (series, boundaries, start, end) = match coverage {
        Some((c, series)) => (
            series.clone(),
            plan.coverage_boundaries(),
            c.window.start,
            c.window.end,
        ),
        None => match merge_windows(report) {
            Some(series) => (series, plan.boundaries(), plan.start(), plan.end()),
            None => return Ok(()),
        },
    };

    let request = ChartRequest {
        title: format!("{name} (hourly)"),
        series: &series,
        boundaries,
        x_start: Some(start),
        x_end: Some(end),
    };
    write_artifacts(&request, start, end, renderer, csv, out, summary)
}

fn emit_current<W: Write>(
    name: &str,
    result: &WindowedResult,
    renderer: &ReportRenderer,
    csv: bool,
    out: &mut W,
    summary: &mut AnalyzeSummary,
) -> Result<(), RenderError> {
    let title = format!("{name}: {}", result.window.label);
    emit(out, &renderer.table(&title, std::slice::from_ref(result)))?;

    if csv {
        if let Some(series) = result.outcome.series() {
            export(series, result.window.start, result.window.end, renderer, out, summary)?;
        }
    }
    Ok(())
}

fn write_artifacts<W: Write>(
    request: &ChartRequest<'_>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    renderer: &ReportRenderer,
    csv: bool,
    out: &mut W,
    summary: &mut AnalyzeSummary,
) -> Result<(), RenderError> {
    let metric = &request.series.metric_name;
    match renderer.chart(request, start, end) {
        Ok(path) => {
            emit(out, &format!("Chart saved: {}", path.display()))?;
            summary.artifacts.push(path);
        }
        Err(RenderError::FontUnavailable) => {
            tracing::warn!(metric = %metric, "No usable font found; skipping chart (set CHART_FONT_PATH)");
        }
        Err(e) => {
            tracing::error!(metric = %metric, error = %e, "Chart rendering failed");
        }
    }

    if csv {
        export(request.series, start, end, renderer, out, summary)?;
    }
    Ok(())
}

fn export<W: Write>(
    series: &MetricSeries,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    renderer: &ReportRenderer,
    out: &mut W,
    summary: &mut AnalyzeSummary,
) -> Result<(), RenderError> {
    match renderer.export(series, start, end) {
        Ok(path) => {
            emit(out, &format!("CSV saved: {}", path.display()))?;
            summary.artifacts.push(path);
        }
        Err(e) => {
            tracing::error!(metric = %series.metric_name, error = %e, "CSV export failed");
        }
    }
    Ok(())
}

/// All daily samples of a report as one series.
fn merge_windows(report: &MetricReport) -> Option<MetricSeries> {
    let mut store = SampleStore::new(report.metric.name.clone(), report.metric.unit_kind);
    for series in report.daily.iter().filter_map(|r| r.outcome.series()) {
        for sample in &series.samples {
            store.insert(sample.timestamp, sample.value);
        }
    }
    (!store.is_empty()).then(|| store.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::query::Profile;
    use crate::test_utils::{mock_backend_empty, mock_backend_error, one_point, t0};
    use crate::traits::MockMetricsBackend;

    fn spoke_args() -> AnalyzeArgs {
        AnalyzeArgs {
            profile: Profile::Spoke,
            ..AnalyzeArgs::default()
        }
    }

    fn renderer(dir: &tempfile::TempDir) -> ReportRenderer {
        ReportRenderer::new(dir.path(), "report")
    }

    #[tokio::test]
    async fn test_connection_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let backend = mock_backend_error(BackendError::AuthenticationFailed);

        let err = run_analyze(backend, &spoke_args(), None, &renderer(&dir), t0(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(BackendError::Network { .. })));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_empty_backend_renders_suggestions_for_every_metric() {
        let dir = tempfile::tempdir().unwrap();
        let plan = WindowPlan::new(t0(), 3, 24, None).unwrap();
        let mut out = Vec::new();

        let summary = run_analyze(
            mock_backend_empty(),
            &spoke_args(),
            Some(&plan),
            &renderer(&dir),
            t0(),
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(summary.metrics, 3);
        assert_eq!(summary.metrics_without_data, 3);
        assert!(summary.artifacts.is_empty());
        assert!(text.contains("Suggestions:"));
        assert!(text.contains("data retention"));
    }

    #[tokio::test]
    async fn test_current_usage_mode_exports_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMetricsBackend::new();
        mock.expect_check_connection().returning(|| true);
        mock.expect_query_instant()
            .times(3)
            .returning(|_| Ok(one_point(t0(), "0.25")));
        let args = AnalyzeArgs {
            csv: true,
            ..spoke_args()
        };
        let mut out = Vec::new();

        let summary = run_analyze(mock, &args, None, &renderer(&dir), t0(), &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Last 24h"));
        assert_eq!(summary.metrics_without_data, 0);
        assert_eq!(summary.artifacts.len(), 3);
        assert!(summary.artifacts.iter().all(|p| p.exists()));
    }
}
