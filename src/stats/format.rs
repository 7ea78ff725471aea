//! Human-readable values and chart axis scaling.

use crate::series::UnitKind;

/// Binary unit labels, one per power of 1024.
pub const BINARY_UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// Largest binary unit index that keeps `|value| / 1024^i >= 1`.
fn binary_exponent(value: f64) -> usize {
    let mut exponent = 0;
    let mut scaled = value.abs();
    while scaled >= 1024.0 && exponent < BINARY_UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }
    exponent
}

fn binary_divisor(exponent: usize) -> f64 {
    (0..exponent).fold(1.0, |acc, _| acc * 1024.0)
}

/// Format a byte count: whole bytes below 1 KiB, two decimals above.
#[must_use]
pub fn format_bytes(value: f64) -> String {
    let exponent = binary_exponent(value);
    if exponent == 0 {
        return format!("{value:.0} B");
    }
    format!("{:.2} {}", value / binary_divisor(exponent), BINARY_UNITS[exponent])
}

/// Format `value` for display according to its unit kind.
#[must_use]
pub fn format_value(value: f64, kind: UnitKind) -> String {
    match kind {
        UnitKind::Bytes => format_bytes(value),
        UnitKind::BytesPerSecond => format!("{}/s", format_bytes(value)),
        UnitKind::CpuSeconds => {
            format!("{value:.3} cores ({:.1}% of one core)", value * 100.0)
        }
        UnitKind::GenericCount => format!("{value:.2}"),
        UnitKind::Percentage => format!("{value:.1}%"),
    }
}

/// Raw value with thousands separators; fractional part kept to two places.
#[must_use]
pub fn format_raw(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let text = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    };
    let (sign, unsigned) = text
        .strip_prefix('-')
        .map_or(("", text.as_str()), |rest| ("-", rest));
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Divisor and label applied to chart y-values.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    /// Every plotted value is divided by this.
    pub divisor: f64,
    /// Unit shown in the axis title.
    pub unit_label: String,
}

impl AxisScale {
    /// Pick a scale for data whose largest value is `max`.
    ///
    /// Byte quantities use the largest binary unit that keeps `max >= 1`;
    /// everything else is plotted unscaled.
    #[must_use]
    pub fn for_max(max: f64, kind: UnitKind) -> Self {
        match kind {
            UnitKind::Bytes | UnitKind::BytesPerSecond => {
                let exponent = binary_exponent(max);
                let suffix = if kind == UnitKind::BytesPerSecond { "/s" } else { "" };
                Self {
                    divisor: binary_divisor(exponent),
                    unit_label: format!("{}{suffix}", BINARY_UNITS[exponent]),
                }
            }
            _ => Self {
                divisor: 1.0,
                unit_label: kind.label().to_string(),
            },
        }
    }

    /// Scale one value.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        value / self.divisor
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, "0 B")]
    #[test_case(512.0, "512 B")]
    #[test_case(1536.0, "1.50 KiB")]
    #[test_case(5.0 * 1024.0 * 1024.0 * 1024.0, "5.00 GiB")]
    #[test_case(3.0 * 1024f64.powi(6), "3072.00 PiB" ; "caps at largest unit")]
    fn test_format_bytes(value: f64, expected: &str) {
        assert_eq!(format_bytes(value), expected);
    }

    #[test_case(2048.0, UnitKind::BytesPerSecond, "2.00 KiB/s")]
    #[test_case(0.25, UnitKind::CpuSeconds, "0.250 cores (25.0% of one core)")]
    #[test_case(42.0, UnitKind::GenericCount, "42.00")]
    #[test_case(99.44, UnitKind::Percentage, "99.4%")]
    fn test_format_value(value: f64, kind: UnitKind, expected: &str) {
        assert_eq!(format_value(value, kind), expected);
    }

    #[test_case(0.0, "0")]
    #[test_case(999.0, "999")]
    #[test_case(1_234_567.0, "1,234,567")]
    #[test_case(-1234.5, "-1,234.50")]
    #[test_case(1000.126, "1,000.13" ; "rounds fraction")]
    fn test_format_raw(value: f64, expected: &str) {
        assert_eq!(format_raw(value), expected);
    }

    #[test]
    fn test_axis_scale_bytes() {
        let scale = AxisScale::for_max(3.0 * 1024.0 * 1024.0, UnitKind::Bytes);
        assert_eq!(scale.unit_label, "MiB");
        assert_eq!(scale.apply(1024.0 * 1024.0), 1.0);
    }

    #[test]
    fn test_axis_scale_small_bytes_unscaled() {
        let scale = AxisScale::for_max(100.0, UnitKind::BytesPerSecond);
        assert_eq!(scale.unit_label, "B/s");
        assert_eq!(scale.divisor, 1.0);
    }

    #[test]
    fn test_axis_scale_non_bytes() {
        let scale = AxisScale::for_max(1e9, UnitKind::CpuSeconds);
        assert_eq!(scale.unit_label, "cores");
        assert_eq!(scale.apply(2.0), 2.0);
    }
}
