//! Calendar window planning.
//!
//! A [`WindowPlan`] turns `(T0, N, L)` into N contiguous, half-open windows
//! `[T0 + i*L, T0 + (i+1)*L)` plus one coverage window used for the hourly
//! query. Every window is computed from the immutable `T0` and its index;
//! nothing is accumulated across iterations.
//!
//! The coverage window is shifted one day earlier than the daily windows:
//! a window labelled "Day i" reports what had accumulated *up to* the start
//! of day i, so the hourly view spans `[T0 - 24h, T0 + N*L - 24h)`.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use prom_window_report::window::WindowPlan;
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
//! let plan = WindowPlan::new(t0, 3, 24, None).unwrap();
//!
//! assert_eq!(plan.windows()[1].start, Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap());
//! assert_eq!(plan.coverage().start, Utc.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap());
//! assert_eq!(plan.coverage().end, Utc.with_ymd_and_hms(2024, 1, 17, 0, 0, 0).unwrap());
//! ```

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default window length in hours.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Shift applied to the hourly coverage window.
pub const COVERAGE_SHIFT_HOURS: i64 = 24;

/// Largest number of windows one plan may hold.
pub const MAX_WINDOWS: usize = 10_000;

/// Format used for window labels and report titles.
pub const LABEL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A half-open interval `[start, end)` with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Zero-based position in the plan.
    pub index: usize,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    /// Display label.
    pub label: String,
}

impl TimeWindow {
    /// Create a window.
    #[must_use]
    pub fn new(
        index: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            index,
            start,
            end,
            label: label.into(),
        }
    }

    /// Returns true if `instant` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Window length.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// `"{start} to {end}"` in RFC 3339 form.
    #[must_use]
    pub fn range_text(&self) -> String {
        format!(
            "{} to {}",
            self.start.format(LABEL_TIME_FORMAT),
            self.end.format(LABEL_TIME_FORMAT)
        )
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// The windows shared by every metric in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    start: DateTime<Utc>,
    length_hours: u32,
    windows: Vec<TimeWindow>,
    coverage: TimeWindow,
}

impl WindowPlan {
    /// Plan `count` windows of `length_hours` starting at `start`.
    ///
    /// When `labels` is given it must hold exactly `count` entries; they
    /// replace the generated `"Day {i+1}: {start} to {end}"` labels.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `count` or `length_hours`
    /// is zero, `count` exceeds [`MAX_WINDOWS`], the label count differs
    /// from `count`, or any window boundary falls outside the representable
    /// date range.
    pub fn new(
        start: DateTime<Utc>,
        count: usize,
        length_hours: u32,
        labels: Option<Vec<String>>,
    ) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::InvalidValue {
                var: "--days".into(),
                reason: "must be a positive number of days".into(),
            });
        }
        if count > MAX_WINDOWS {
            return Err(ConfigError::InvalidValue {
                var: "--days".into(),
                reason: format!("must be at most {MAX_WINDOWS}"),
            });
        }
        if length_hours == 0 {
            return Err(ConfigError::InvalidValue {
                var: "--window-hours".into(),
                reason: "must be a positive number of hours".into(),
            });
        }
        if let Some(labels) = &labels {
            if labels.len() != count {
                return Err(ConfigError::InvalidValue {
                    var: "--day-labels".into(),
                    reason: format!("expected {count} labels, got {}", labels.len()),
                });
            }
        }

        let out_of_range = |var: &str| ConfigError::InvalidValue {
            var: var.into(),
            reason: "windows extend past the supported date range".into(),
        };
        let length = TimeDelta::try_hours(i64::from(length_hours))
            .ok_or_else(|| out_of_range("--window-hours"))?;
        let plan_end =
            window_start(start, length, count).ok_or_else(|| out_of_range("--window-hours"))?;

        let windows = (0..count)
            .map(|i| {
                let (Some(from), Some(to)) = (
                    window_start(start, length, i),
                    window_start(start, length, i + 1),
                ) else {
                    return Err(out_of_range("--window-hours"));
                };
                let label = labels.as_ref().map_or_else(
                    || {
                        format!(
                            "Day {}: {} to {}",
                            i + 1,
                            from.format(LABEL_TIME_FORMAT),
                            to.format(LABEL_TIME_FORMAT)
                        )
                    },
                    |labels| labels[i].clone(),
                );
                Ok(TimeWindow::new(i, from, to, label))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shift = TimeDelta::hours(COVERAGE_SHIFT_HOURS);
        let coverage_start = start
            .checked_sub_signed(shift)
            .ok_or_else(|| out_of_range("--date"))?;
        let coverage_end = plan_end
            .checked_sub_signed(shift)
            .ok_or_else(|| out_of_range("--window-hours"))?;
        let coverage = TimeWindow::new(
            0,
            coverage_start,
            coverage_end,
            format!(
                "Hourly: {} to {}",
                coverage_start.format(LABEL_TIME_FORMAT),
                coverage_end.format(LABEL_TIME_FORMAT)
            ),
        );

        Ok(Self {
            start,
            length_hours,
            windows,
            coverage,
        })
    }

    /// The plan's immutable start instant `T0`.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Window length in hours.
    #[must_use]
    pub const fn length_hours(&self) -> u32 {
        self.length_hours
    }

    /// The N daily windows in order.
    #[must_use]
    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    /// Number of daily windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Always false; a plan holds at least one window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// The hourly coverage window.
    #[must_use]
    pub const fn coverage(&self) -> &TimeWindow {
        &self.coverage
    }

    /// End of the last daily window.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.windows.last().map_or(self.start, |w| w.end)
    }

    /// Day separators for the hourly coverage view: one per daily window,
    /// placed where that window's segment of the coverage begins.
    #[must_use]
    pub fn coverage_boundaries(&self) -> Vec<(DateTime<Utc>, String)> {
        let shift = TimeDelta::hours(COVERAGE_SHIFT_HOURS);
        self.windows
            .iter()
            .map(|w| (w.start - shift, w.label.clone()))
            .collect()
    }

    /// Day separators for the daily view: each window's start.
    #[must_use]
    pub fn boundaries(&self) -> Vec<(DateTime<Utc>, String)> {
        self.windows
            .iter()
            .map(|w| (w.start, w.label.clone()))
            .collect()
    }
}

/// Day separators for a chart that does not come from a plan.
///
/// The first separator sits at `anchor` with `labels[0]`; the rest follow
/// every 24 hours while labels remain and the separator is not past
/// `until`.
#[must_use]
pub fn day_boundaries(
    anchor: DateTime<Utc>,
    labels: &[String],
    until: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, String)> {
    let day = TimeDelta::hours(COVERAGE_SHIFT_HOURS);
    labels
        .iter()
        .enumerate()
        .map_while(|(i, label)| window_start(anchor, day, i).map(|at| (at, label.clone())))
        .take_while(|(at, _)| *at == anchor || *at <= until)
        .collect()
}

/// Start of window `index`: `T0 + index * length`, or `None` on overflow.
fn window_start(start: DateTime<Utc>, length: TimeDelta, index: usize) -> Option<DateTime<Utc>> {
    let offset = length.checked_mul(i32::try_from(index).ok()?)?;
    start.checked_add_signed(offset)
}
