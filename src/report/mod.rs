//! Report rendering: text tables, annotated charts, and CSV exports.
//!
//! [`ReportRenderer`] owns the output location and artifact naming; the
//! submodules hold the pure formatting and drawing functions it delegates to.
//! Tables and chart statistics boxes are produced from the same
//! [`SeriesStats`](crate::stats::SeriesStats) values.

mod chart;
mod csv_export;
mod naming;
mod table;

pub use chart::{
    ensure_font, render_chart, ChartLayout, ChartRequest, CHART_HEIGHT, CHART_WIDTH,
    STATS_PANEL_WIDTH, X_LEAD_HOURS, Y_TOP_MARGIN,
};
pub use csv_export::{export_csv, write_series};
pub use naming::{artifact_file_name, artifact_path, sanitize_component, FILE_TIME_FORMAT};
pub use table::{
    collect_rows, render_diagnostic, render_grid, render_windowed, stats_lines, TableRow,
    ROW_TIME_FORMAT,
};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::RenderError;
use crate::query::WindowedResult;
use crate::series::MetricSeries;

/// Writes reports under one output directory with one file-name prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRenderer {
    output_dir: PathBuf,
    prefix: String,
    font_path: Option<PathBuf>,
}

impl ReportRenderer {
    /// Create a renderer writing to `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
            font_path: None,
        }
    }

    /// Create a renderer from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let renderer = Self::new(&config.output_dir, &config.report_prefix);
        match &config.chart_font_path {
            Some(path) => renderer.with_font_path(path),
            None => renderer,
        }
    }

    /// Use a specific TrueType font for chart text.
    #[must_use]
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// Replace the file-name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path for an artifact covering `[start, end]` of `metric_name`.
    #[must_use]
    pub fn artifact_path(
        &self,
        metric_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        extension: &str,
    ) -> PathBuf {
        artifact_path(&self.output_dir, &self.prefix, metric_name, start, end, extension)
    }

    /// Text table (or diagnostics) for one metric's windows.
    #[must_use]
    pub fn table(&self, title: &str, results: &[WindowedResult]) -> String {
        render_windowed(title, results)
    }

    /// Render a chart named after the series and `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the chart cannot be drawn or written.
    pub fn chart(
        &self,
        request: &ChartRequest<'_>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PathBuf, RenderError> {
        let path = self.artifact_path(&request.series.metric_name, start, end, "png");
        render_chart(&path, request, self.font_path.as_deref())?;
        Ok(path)
    }

    /// Render a chart to an explicit `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the chart cannot be drawn or written.
    pub fn chart_at(&self, path: &Path, request: &ChartRequest<'_>) -> Result<(), RenderError> {
        render_chart(path, request, self.font_path.as_deref())
    }

    /// Export a series as CSV named after the series and `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the directory or file cannot be written.
    pub fn export(
        &self,
        series: &MetricSeries,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PathBuf, RenderError> {
        self.ensure_output_dir()?;
        let path = self.artifact_path(&series.metric_name, start, end, "csv");
        export_csv(&path, series)?;
        Ok(path)
    }

    /// Create the output directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the directory cannot be created.
    pub fn ensure_output_dir(&self) -> Result<(), RenderError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| RenderError::Io {
            path: self.output_dir.display().to_string(),
            message: e.to_string(),
        })
    }
}
