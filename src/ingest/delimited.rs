//! Delimited-text (CSV) sources.
//!
//! Each file needs a header row with a `timestamp` column and one value
//! column chosen from [`VALUE_FIELDS`] in priority order. Optional
//! `metric_name` and `unit` columns name the series.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::StringRecord;

use super::{IngestReport, SkipReason, SourceReport, SourceStatus};
use crate::series::{SampleStore, UnitKind};

/// Timestamp format of the `timestamp` column, interpreted as UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIMESTAMP_COLUMN: &str = "timestamp";
const METRIC_NAME_COLUMN: &str = "metric_name";
const UNIT_COLUMN: &str = "unit";

/// A recognized value column and the unit it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueField {
    /// Column name, matched exactly.
    pub name: &'static str,
    /// Unit implied by the column.
    pub unit_kind: UnitKind,
}

/// Recognized value columns, highest priority first.
pub const VALUE_FIELDS: &[ValueField] = &[
    ValueField {
        name: "value_seconds",
        unit_kind: UnitKind::CpuSeconds,
    },
    ValueField {
        name: "value_bytes",
        unit_kind: UnitKind::Bytes,
    },
    ValueField {
        name: "value_bytes_per_s",
        unit_kind: UnitKind::BytesPerSecond,
    },
    ValueField {
        name: "value",
        unit_kind: UnitKind::GenericCount,
    },
    ValueField {
        name: "Value",
        unit_kind: UnitKind::GenericCount,
    },
];

impl ValueField {
    /// First recognized value column present in `headers`, with its index.
    #[must_use]
    pub fn resolve(headers: &StringRecord) -> Option<(usize, Self)> {
        VALUE_FIELDS.iter().find_map(|field| {
            column_index(headers, field.name).map(|idx| (idx, *field))
        })
    }

    /// Highest-priority column that implies `unit_kind`, or `"value"` when
    /// no column does.
    #[must_use]
    pub fn column_for(unit_kind: UnitKind) -> &'static str {
        VALUE_FIELDS
            .iter()
            .find(|field| field.unit_kind == unit_kind)
            .map_or("value", |field| field.name)
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Column positions resolved once per source.
#[derive(Debug, Clone, Copy)]
struct Columns {
    timestamp: Option<usize>,
    value: Option<(usize, ValueField)>,
    metric_name: Option<usize>,
    unit: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Self {
            timestamp: column_index(headers, TIMESTAMP_COLUMN),
            value: ValueField::resolve(headers),
            metric_name: column_index(headers, METRIC_NAME_COLUMN),
            unit: column_index(headers, UNIT_COLUMN),
        }
    }
}

/// Parse one row into a timestamp and value.
fn parse_row(record: &StringRecord, columns: &Columns) -> Result<(DateTime<Utc>, f64), SkipReason> {
    let raw_ts = columns
        .timestamp
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::MissingTimestamp)?;

    let (value_idx, _) = columns.value.ok_or(SkipReason::NoValueField)?;
    let raw_value = record
        .get(value_idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::MissingValue)?;

    let timestamp = NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT)
        .map_err(|_| SkipReason::InvalidTimestamp(raw_ts.to_string()))?
        .and_utc();

    let value = raw_value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SkipReason::InvalidValue(raw_value.to_string()))?;

    Ok((timestamp, value))
}

/// Ingest every row of one delimited source into `store`.
///
/// Returns `(rows_read, rows_skipped)`.
///
/// # Errors
///
/// Returns the CSV error only when the header row itself cannot be read;
/// row-level problems are skipped and counted.
pub fn ingest_reader<R: Read>(
    store: &mut SampleStore,
    reader: R,
    source: &str,
) -> Result<(usize, usize), csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = Columns::from_headers(&headers);
    if columns.value.is_none() {
        tracing::warn!(source, "No recognized value column; every row will be skipped");
    }

    let mut read = 0;
    let mut skipped = 0;

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                tracing::warn!(source, line, reason = %e, "Skipping invalid row");
                skipped += 1;
                continue;
            }
        };
        let line = record.position().map_or(0, csv::Position::line);

        if let Some(name) = columns.metric_name.and_then(|idx| record.get(idx)) {
            store.set_metric_name_once(name);
        }
        if let Some(unit) = columns.unit.and_then(|idx| record.get(idx)) {
            store.set_unit_once(unit);
        }

        match parse_row(&record, &columns) {
            Ok((timestamp, value)) => {
                if let Some((_, field)) = columns.value {
                    store.set_unit_kind_once(field.unit_kind);
                }
                store.insert(timestamp, value);
                read += 1;
            }
            Err(reason) => {
                tracing::warn!(source, line, reason = %reason, "Skipping invalid row");
                skipped += 1;
            }
        }
    }

    Ok((read, skipped))
}

/// Ingest several files, in order, into one store.
///
/// Later files overwrite earlier ones at equal timestamps. A file that
/// cannot be opened or whose header cannot be read is recorded as
/// unavailable and contributes zero samples.
pub fn ingest_files<P: AsRef<Path>>(store: &mut SampleStore, paths: &[P]) -> IngestReport {
    let mut report = IngestReport::default();

    for path in paths {
        let path = path.as_ref();
        let source = path.display().to_string();

        let outcome = File::open(path)
            .map_err(|e| e.to_string())
            .and_then(|file| ingest_reader(store, file, &source).map_err(|e| e.to_string()));

        let entry = match outcome {
            Ok((rows_read, rows_skipped)) => {
                tracing::info!(source = %source, rows_read, rows_skipped, "Read source");
                SourceReport {
                    path: PathBuf::from(path),
                    rows_read,
                    rows_skipped,
                    status: SourceStatus::Read,
                }
            }
            Err(message) => {
                tracing::warn!(source = %source, error = %message, "Skipping unavailable source");
                SourceReport {
                    path: PathBuf::from(path),
                    rows_read: 0,
                    rows_skipped: 0,
                    status: SourceStatus::Unavailable(message),
                }
            }
        };
        report.sources.push(entry);
    }

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use test_case::test_case;

    fn headers(cols: &[&str]) -> StringRecord {
        StringRecord::from(cols.to_vec())
    }

    #[test_case(&["timestamp", "value", "value_bytes"], "value_bytes" ; "bytes beats generic")]
    #[test_case(&["value_bytes_per_s", "value_seconds"], "value_seconds" ; "seconds has top priority")]
    #[test_case(&["Value", "timestamp"], "Value" ; "capitalized generic")]
    #[test_case(&["timestamp", "value", "Value"], "value" ; "lowercase generic first")]
    fn test_value_field_priority(cols: &[&str], expected: &str) {
        let (_, field) = ValueField::resolve(&headers(cols)).unwrap();
        assert_eq!(field.name, expected);
    }

    #[test_case(UnitKind::Bytes, "value_bytes")]
    #[test_case(UnitKind::BytesPerSecond, "value_bytes_per_s")]
    #[test_case(UnitKind::CpuSeconds, "value_seconds")]
    #[test_case(UnitKind::GenericCount, "value")]
    #[test_case(UnitKind::Percentage, "value")]
    fn test_column_for_unit_kind(kind: UnitKind, expected: &str) {
        assert_eq!(ValueField::column_for(kind), expected);
    }

    #[test]
    fn test_value_field_none() {
        assert!(ValueField::resolve(&headers(&["timestamp", "reading"])).is_none());
    }

    #[test_case("2024-01-01 00:00:00", "10", Ok(10.0) ; "valid row")]
    #[test_case("", "10", Err(SkipReason::MissingTimestamp) ; "empty timestamp")]
    #[test_case("01/01/2024", "10", Err(SkipReason::InvalidTimestamp("01/01/2024".into())) ; "wrong timestamp format")]
    #[test_case("2024-01-01 00:00:00", "", Err(SkipReason::MissingValue) ; "empty value")]
    #[test_case("2024-01-01 00:00:00", "ten", Err(SkipReason::InvalidValue("ten".into())) ; "non numeric value")]
    #[test_case("2024-01-01 00:00:00", "NaN", Err(SkipReason::InvalidValue("NaN".into())) ; "non finite value")]
    fn test_parse_row(ts: &str, value: &str, expected: Result<f64, SkipReason>) {
        let hdr = headers(&["timestamp", "value"]);
        let columns = Columns::from_headers(&hdr);
        let record = StringRecord::from(vec![ts, value]);
        let parsed = parse_row(&record, &columns).map(|(_, v)| v);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_ingest_reader_counts_and_metadata() {
        let data = "\
timestamp,metric_name,value_bytes
2024-01-01 00:00:00,bucket used,100
not-a-date,bucket used,200
2024-01-01 01:00:00,other name,300
2024-01-01 02:00:00,,
";
        let mut store = SampleStore::unnamed();
        let (read, skipped) = ingest_reader(&mut store, data.as_bytes(), "inline").unwrap();
        assert_eq!((read, skipped), (2, 2));

        let series = store.finalize();
        assert_eq!(series.metric_name, "bucket used");
        assert_eq!(series.unit_kind, UnitKind::Bytes);
        assert_eq!(series.unit, "bytes");
        assert_eq!(
            series.samples[1].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_ingest_reader_without_value_column_skips_all() {
        let data = "timestamp,reading\n2024-01-01 00:00:00,1\n2024-01-01 01:00:00,2\n";
        let mut store = SampleStore::unnamed();
        let (read, skipped) = ingest_reader(&mut store, data.as_bytes(), "inline").unwrap();
        assert_eq!((read, skipped), (0, 2));
        assert!(store.is_empty());
    }

    #[test]
    fn test_ingest_files_missing_source_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let mut file = File::create(&good).unwrap();
        writeln!(file, "timestamp,value\n2024-01-01 00:00:00,5").unwrap();
        let missing = dir.path().join("missing.csv");

        let mut store = SampleStore::unnamed();
        let report = ingest_files(&mut store, &[missing.clone(), good.clone()]);

        assert_eq!(report.sources.len(), 2);
        assert!(matches!(report.sources[0].status, SourceStatus::Unavailable(_)));
        assert_eq!(report.sources[0].path, missing);
        assert_eq!(report.sources[1].status, SourceStatus::Read);
        assert_eq!(report.total_read(), 1);
        assert_eq!(store.len(), 1);
    }
}
