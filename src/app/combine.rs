//! The `combine` command.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};

use super::emit;
use crate::cli::CombineArgs;
use crate::error::{AppError, RenderError};
use crate::ingest::{ingest_files, IngestReport};
use crate::report::{stats_lines, ChartRequest, ReportRenderer, ROW_TIME_FORMAT};
use crate::series::{DedupStats, MetricSeries, SampleStore};
use crate::stats::SeriesStats;
use crate::window::day_boundaries;

/// What a `combine` run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineSummary {
    /// Per-source ingestion results.
    pub ingest: IngestReport,
    /// The merged series.
    pub series: MetricSeries,
    /// Insert and duplicate counts.
    pub dedup: DedupStats,
    /// Chart written, unless no font was available.
    pub chart: Option<PathBuf>,
    /// CSV export, when requested.
    pub csv: Option<PathBuf>,
}

/// Merge the CSV files in `args`, print a summary, chart the result, and
/// optionally export it.
///
/// Later files win on repeated timestamps. `start` aligns the x-axis and
/// anchors the day separators; without it the first sample is the anchor.
///
/// # Errors
///
/// Returns [`RenderError::NoData`] when no source yields a sample, and
/// other [`RenderError`]s when the chart or export cannot be written.
/// A missing font only skips the chart.
pub fn run_combine<W: Write>(
    args: &CombineArgs,
    start: Option<DateTime<Utc>>,
    renderer: &ReportRenderer,
    out: &mut W,
) -> Result<CombineSummary, AppError> {
    let mut store = SampleStore::unnamed();
    let ingest = ingest_files(&mut store, &args.files);
    let series = store.finalize();
    let dedup = series.dedup;

    tracing::info!(
        sources = ingest.sources.len(),
        unavailable = ingest.unavailable(),
        rows_read = ingest.total_read(),
        rows_skipped = ingest.total_skipped(),
        unique = dedup.unique,
        "Combined sources"
    );
    emit(
        out,
        &format!(
            "Combined {} file(s)\n  Total data points read: {}\n  Unique timestamps: {}\n  Duplicates removed: {}\n  Rows skipped: {}",
            ingest.sources.len() - ingest.unavailable(),
            ingest.total_read(),
            dedup.unique,
            dedup.duplicates_removed,
            ingest.total_skipped(),
        ),
    )?;
    for source in ingest.sources.iter().filter(|s| s.rows_read == 0) {
        emit(out, &format!("  No rows from {}", source.path.display()))?;
    }

    let (Some(stats), Some((first, last))) =
        (SeriesStats::from_samples(&series.samples), series.time_span())
    else {
        return Err(RenderError::NoData.into());
    };
    emit(
        out,
        &format!(
            "  Time range: {} to {}\n  {}",
            first.format(ROW_TIME_FORMAT),
            last.format(ROW_TIME_FORMAT),
            stats_lines(&stats, series.unit_kind).join("\n  ")
        ),
    )?;

    let x_start = start.unwrap_or(first);
    let x_end = match (start, &args.day_labels) {
        (Some(start), Some(labels)) => {
            start + TimeDelta::days(i64::try_from(labels.len()).unwrap_or_default())
        }
        _ => last,
    };
    let boundaries = args
        .day_labels
        .as_deref()
        .map(|labels| day_boundaries(x_start, labels, x_end))
        .unwrap_or_default();

    let title = args.title.clone().unwrap_or_else(|| {
        format!(
            "Combined Time Series - {} ({} to {})",
            series.metric_name,
            x_start.format(ROW_TIME_FORMAT),
            x_end.format(ROW_TIME_FORMAT)
        )
    });
    let request = ChartRequest {
        title,
        series: &series,
        boundaries,
        x_start: start,
        x_end: Some(x_end),
    };

    let chart = match renderer.chart_at(&args.output, &request) {
        Ok(()) => {
            emit(out, &format!("Graph saved: {}", args.output.display()))?;
            Some(args.output.clone())
        }
        Err(RenderError::FontUnavailable) => {
            tracing::warn!("No usable font found; skipping chart (set CHART_FONT_PATH)");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let csv = if args.csv {
        let path = renderer.export(&series, first, last)?;
        emit(out, &format!("CSV saved: {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    Ok(CombineSummary {
        ingest,
        series,
        dedup,
        chart,
        csv,
    })
}
