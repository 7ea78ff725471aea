//! Plain-text grid tables and diagnostic blocks.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::error::ErrorInfo;
use crate::query::WindowedResult;
use crate::series::UnitKind;
use crate::stats::{format_raw, format_value, SeriesStats};

/// Timestamp format shown in table rows.
pub const ROW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Position of the source window; orders rows across windows.
    pub window_index: usize,
    /// Window label.
    pub window_label: String,
    /// Sample instant.
    pub timestamp: DateTime<Utc>,
    /// Series display name.
    pub metric_name: String,
    /// Raw value.
    pub value: f64,
    /// Unit of `value`.
    pub unit_kind: UnitKind,
}

/// Flatten windowed results into rows sorted by window, then timestamp.
#[must_use]
pub fn collect_rows(results: &[WindowedResult]) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = results
        .iter()
        .filter_map(|r| r.outcome.series().map(|series| (r, series)))
        .flat_map(|(r, series)| {
            series.samples.iter().map(move |sample| TableRow {
                window_index: r.window.index,
                window_label: r.window.label.clone(),
                timestamp: sample.timestamp,
                metric_name: series.metric_name.clone(),
                value: sample.value,
                unit_kind: series.unit_kind,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.window_index
            .cmp(&b.window_index)
            .then(a.timestamp.cmp(&b.timestamp))
    });
    rows
}

fn grid_rule(widths: &[usize], fill: char) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.extend(std::iter::repeat(fill).take(width + 2));
        line.push('+');
    }
    line
}

fn grid_line<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.zip(widths) {
        let pad = width.saturating_sub(cell.chars().count());
        let _ = write!(line, " {cell}{} |", " ".repeat(pad));
    }
    line
}

/// Render rows in a `+---+` grid with a `+===+` rule under the header.
#[must_use]
pub fn render_grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = Vec::with_capacity(rows.len() * 2 + 3);
    out.push(grid_rule(&widths, '-'));
    out.push(grid_line(&widths, headers.iter().copied()));
    out.push(grid_rule(&widths, '='));
    for row in rows {
        out.push(grid_line(&widths, row.iter().map(String::as_str)));
        out.push(grid_rule(&widths, '-'));
    }
    out.join("\n")
}

/// Message, context, and suggestion list for a window without data.
#[must_use]
pub fn render_diagnostic(info: &ErrorInfo) -> String {
    let mut out = format!("No data: {}\n", info.message);
    if !info.context.is_empty() {
        let _ = writeln!(out, "  Context: {}", info.context);
    }
    if !info.suggestions.is_empty() {
        out.push_str("  Suggestions:\n");
        for suggestion in &info.suggestions {
            let _ = writeln!(out, "    - {suggestion}");
        }
    }
    out
}

/// Statistics lines shared by the table summary and the chart box.
#[must_use]
pub fn stats_lines(stats: &SeriesStats, kind: UnitKind) -> Vec<String> {
    vec![
        format!("Avg: {}", format_value(stats.mean, kind)),
        format!("Min: {}", format_value(stats.min, kind)),
        format!("Max: {}", format_value(stats.max, kind)),
        format!("Growth: {:+.1}%", stats.growth_percent),
        format!("Points: {}", stats.count),
    ]
}

/// Full text report for one metric's windows.
///
/// Windows with data become table rows; when no window has data the
/// diagnostics are printed instead of an empty table.
#[must_use]
pub fn render_windowed(title: &str, results: &[WindowedResult]) -> String {
    let mut out = format!("{title}\n{}\n", "=".repeat(title.chars().count().min(120)));
    let rows = collect_rows(results);
    let missing: Vec<(&str, &ErrorInfo)> = results
        .iter()
        .filter_map(|r| r.outcome.error_info().map(|info| (r.window.label.as_str(), info)))
        .collect();

    if rows.is_empty() {
        for (label, info) in &missing {
            let _ = writeln!(out, "[{label}]");
            out.push_str(&render_diagnostic(info));
        }
        if missing.is_empty() {
            out.push_str("No windows were queried\n");
        }
        return out;
    }

    let _ = writeln!(
        out,
        "Found {} data points across {} time range(s)",
        rows.len(),
        results.len()
    );
    let multi = results.len() > 1;
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(5);
            if multi {
                cells.push(row.window_label.clone());
            }
            cells.push(row.timestamp.format(ROW_TIME_FORMAT).to_string());
            cells.push(row.metric_name.clone());
            cells.push(format_raw(row.value));
            cells.push(format_value(row.value, row.unit_kind));
            cells
        })
        .collect();
    let headers: &[&str] = if multi {
        &["Time Range", "Timestamp", "Metric", "Value", "Value (Human Readable)"]
    } else {
        &["Timestamp", "Metric", "Value", "Value (Human Readable)"]
    };
    out.push_str(&render_grid(headers, &body));
    out.push('\n');

    let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
    if let Some(stats) = SeriesStats::from_values(&values) {
        out.push_str("Summary: ");
        out.push_str(&stats_lines(&stats, rows[0].unit_kind).join(", "));
        out.push('\n');
    }

    for (label, info) in &missing {
        let _ = writeln!(out, "[{label}] {}", info.message);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::query::WindowOutcome;
    use crate::series::SampleStore;
    use crate::window::TimeWindow;
    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;

    fn window(index: usize, label: &str) -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
            + TimeDelta::days(i64::try_from(index).unwrap());
        TimeWindow::new(index, start, start + TimeDelta::days(1), label)
    }

    fn data(index: usize, label: &str, values: &[f64]) -> WindowedResult {
        let w = window(index, label);
        let mut store = SampleStore::new("bucket", UnitKind::Bytes);
        for (i, v) in values.iter().enumerate() {
            store.insert(w.start + TimeDelta::hours(i64::try_from(i).unwrap()), *v);
        }
        WindowedResult {
            window: w,
            outcome: WindowOutcome::Data(store.finalize()),
        }
    }

    fn empty(index: usize, label: &str) -> WindowedResult {
        WindowedResult {
            window: window(index, label),
            outcome: WindowOutcome::Empty(
                ErrorInfo::new("No data found", "ctx")
                    .with_suggestions(["Verify the metric name is correct"]),
            ),
        }
    }

    #[test]
    fn test_render_grid() {
        let grid = render_grid(&["A", "Bee"], &[vec!["xx".into(), "y".into()]]);
        assert_eq!(
            grid,
            "+----+-----+\n\
             | A  | Bee |\n\
             +====+=====+\n\
             | xx | y   |\n\
             +----+-----+"
        );
    }

    #[test]
    fn test_rows_ordered_by_window_index_not_label() {
        // "Day 10" sorts before "Day 2" as text; index order must win.
        let results = vec![data(1, "Day 10", &[3.0]), data(0, "Day 2", &[1.0, 2.0])];
        let rows = collect_rows(&results);
        let labels: Vec<&str> = rows.iter().map(|r| r.window_label.as_str()).collect();
        assert_eq!(labels, vec!["Day 2", "Day 2", "Day 10"]);
        assert!(rows[0].timestamp < rows[1].timestamp);
    }

    #[test]
    fn test_empty_results_render_diagnostics() {
        let report = render_windowed("Bucket usage", &[empty(0, "Day 1"), empty(1, "Day 2")]);
        assert!(report.contains("[Day 1]"));
        assert!(report.contains("    - Verify the metric name is correct"));
        assert!(!report.contains("+---"));
    }

    #[test]
    fn test_partial_results_render_table_and_notes() {
        let report = render_windowed(
            "Bucket usage",
            &[data(0, "Day 1", &[1024.0, 2048.0]), empty(1, "Day 2")],
        );
        assert!(report.contains("Found 2 data points across 2 time range(s)"));
        assert!(report.contains("| Time Range"));
        assert!(report.contains("1.00 KiB"));
        assert!(report.contains("Growth: +100.0%"));
        assert!(report.contains("[Day 2] No data found"));
    }

    #[test]
    fn test_single_window_has_no_range_column() {
        let report = render_windowed("Now", &[data(0, "Last 24h", &[5.0])]);
        assert!(report.contains("| Timestamp"));
        assert!(!report.contains("Time Range"));
    }

    #[test]
    fn test_stats_lines() {
        let stats = SeriesStats::from_values(&[0.5, 1.0]).unwrap();
        let lines = stats_lines(&stats, UnitKind::CpuSeconds);
        assert_eq!(lines[3], "Growth: +100.0%");
        assert_eq!(lines[4], "Points: 2");
    }
}
