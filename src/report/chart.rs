//! Annotated line charts.
//!
//! The chart shows one time-ordered line for a series, a vertical separator
//! with its label at each window boundary, and a side panel with the same
//! statistics the table prints. Layout is computed by [`ChartLayout`]
//! independently of drawing so it can be tested without a font.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, TimeDelta, Utc};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle, FontTransform};

use super::table::stats_lines;
use crate::error::RenderError;
use crate::series::MetricSeries;
use crate::stats::{AxisScale, SeriesStats};

/// Output width in pixels.
pub const CHART_WIDTH: u32 = 2000;
/// Output height in pixels.
pub const CHART_HEIGHT: u32 = 800;
/// Width of the statistics panel on the right.
pub const STATS_PANEL_WIDTH: u32 = 360;
/// Headroom above the observed maximum.
pub const Y_TOP_MARGIN: f64 = 0.15;
/// How far before a supplied start the x-axis begins.
pub const X_LEAD_HOURS: i64 = 3;

const FONT_FAMILY: &str = "sans-serif";
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const MARKER_COLOR: RGBColor = RGBColor(255, 127, 14);
const BOUNDARY_COLOR: RGBColor = RGBColor(214, 39, 40);
const PANEL_COLOR: RGBColor = RGBColor(224, 238, 248);

/// Font files tried, in order, after `CHART_FONT_PATH`.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// What to draw.
#[derive(Debug, Clone)]
pub struct ChartRequest<'a> {
    /// Caption.
    pub title: String,
    /// Series to plot.
    pub series: &'a MetricSeries,
    /// Separator positions and labels.
    pub boundaries: Vec<(DateTime<Utc>, String)>,
    /// Explicit x-axis start; the axis then begins [`X_LEAD_HOURS`] earlier.
    pub x_start: Option<DateTime<Utc>>,
    /// Explicit x-axis end; defaults to the last sample.
    pub x_end: Option<DateTime<Utc>>,
}

/// Axis ranges, scaling, and statistics for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// Left edge of the x-axis.
    pub x_start: DateTime<Utc>,
    /// Right edge of the x-axis.
    pub x_end: DateTime<Utc>,
    /// Top of the y-axis, in scaled units. The bottom is always 0.
    pub y_max: f64,
    /// Scale applied to every y-value.
    pub scale: AxisScale,
    /// Statistics shown in the side panel.
    pub stats: SeriesStats,
    /// Separators that fall inside the x-axis range.
    pub boundaries: Vec<(DateTime<Utc>, String)>,
}

impl ChartLayout {
    /// Compute the layout for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoData`] when the series is empty.
    pub fn compute(request: &ChartRequest<'_>) -> Result<Self, RenderError> {
        let series = request.series;
        let stats = SeriesStats::from_samples(&series.samples).ok_or(RenderError::NoData)?;
        let (first, last) = series.time_span().ok_or(RenderError::NoData)?;

        let scale = AxisScale::for_max(stats.max, series.unit_kind);
        let scaled_max = scale.apply(stats.max);
        let y_max = if scaled_max > 0.0 {
            scaled_max * (1.0 + Y_TOP_MARGIN)
        } else {
            1.0
        };

        let (mut x_start, mut x_end) = match request.x_start {
            Some(start) => (
                start - TimeDelta::hours(X_LEAD_HOURS),
                request.x_end.unwrap_or(last),
            ),
            None => (first, request.x_end.unwrap_or(last)),
        };
        if x_end <= x_start {
            x_start -= TimeDelta::hours(1);
            x_end = x_start + TimeDelta::hours(2);
        }

        let boundaries = request
            .boundaries
            .iter()
            .filter(|(at, _)| *at >= x_start && *at <= x_end)
            .cloned()
            .collect();

        Ok(Self {
            x_start,
            x_end,
            y_max,
            scale,
            stats,
            boundaries,
        })
    }

    /// Y-axis title: metric name and scaled unit.
    #[must_use]
    pub fn y_title(&self, metric_name: &str) -> String {
        if self.scale.unit_label.is_empty() {
            metric_name.to_string()
        } else {
            format!("{metric_name} ({})", self.scale.unit_label)
        }
    }
}

fn chart_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Chart {
        message: e.to_string(),
    }
}

fn register_first_font(font_path: Option<&Path>) -> bool {
    let candidates = font_path
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

    for candidate in candidates {
        let Ok(bytes) = std::fs::read(&candidate) else {
            continue;
        };
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
            tracing::debug!(font = %candidate.display(), "Registered chart font");
            return true;
        }
        tracing::warn!(font = %candidate.display(), "Font file could not be parsed");
    }
    false
}

/// Register a TrueType font for chart text, once per process.
///
/// `font_path` is tried first, then common system locations.
///
/// # Errors
///
/// Returns [`RenderError::FontUnavailable`] when no font could be loaded.
pub fn ensure_font(font_path: Option<&Path>) -> Result<(), RenderError> {
    if *FONT_READY.get_or_init(|| register_first_font(font_path)) {
        Ok(())
    } else {
        Err(RenderError::FontUnavailable)
    }
}

/// Draw `request` as a PNG at `path`.
///
/// # Errors
///
/// Returns [`RenderError`] when the series is empty, no font is available,
/// or drawing/encoding fails.
pub fn render_chart(
    path: &Path,
    request: &ChartRequest<'_>,
    font_path: Option<&Path>,
) -> Result<(), RenderError> {
    let layout = ChartLayout::compute(request)?;
    ensure_font(font_path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RenderError::Io {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let plot_width = i32::try_from(CHART_WIDTH - STATS_PANEL_WIDTH).map_err(chart_error)?;
    let (plot_area, panel) = root.split_horizontally(plot_width);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(&request.title, (FONT_FAMILY, 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(layout.x_start..layout.x_end, 0f64..layout.y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Time (UTC)")
        .y_desc(layout.y_title(&request.series.metric_name))
        .x_labels(12)
        .x_label_formatter(&|t: &DateTime<Utc>| t.format("%m/%d %H:%M").to_string())
        .draw()
        .map_err(chart_error)?;

    let points: Vec<(DateTime<Utc>, f64)> = request
        .series
        .samples
        .iter()
        .map(|s| (s.timestamp, layout.scale.apply(s.value)))
        .collect();

    chart
        .draw_series(LineSeries::new(points.iter().copied(), LINE_COLOR.stroke_width(2)))
        .map_err(chart_error)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(t, v)| Circle::new((t, v), 3, MARKER_COLOR.filled())),
        )
        .map_err(chart_error)?;

    let label_style = (FONT_FAMILY, 16)
        .into_font()
        .transform(FontTransform::Rotate90)
        .color(&BOUNDARY_COLOR);
    for (at, label) in &layout.boundaries {
        chart
            .draw_series(LineSeries::new(
                [(*at, 0.0), (*at, layout.y_max)],
                BOUNDARY_COLOR.stroke_width(2),
            ))
            .map_err(chart_error)?;
        chart
            .draw_series(std::iter::once(Text::new(
                label.clone(),
                (*at, layout.y_max),
                label_style.clone(),
            )))
            .map_err(chart_error)?;
    }

    panel.fill(&PANEL_COLOR).map_err(chart_error)?;
    let text_style = (FONT_FAMILY, 20).into_font().color(&BLACK);
    let mut lines = vec!["Statistics".to_string()];
    lines.extend(stats_lines(&layout.stats, request.series.unit_kind));
    for (i, line) in (0i32..).zip(lines) {
        panel
            .draw(&Text::new(line, (20, 80 + i * 34), text_style.clone()))
            .map_err(chart_error)?;
    }

    root.present().map_err(chart_error)?;
    tracing::info!(path = %path.display(), points = points.len(), "Chart written");
    Ok(())
}
