//! Normalizes rows from delimited-text files and backend results into a
//! [`SampleStore`](crate::series::SampleStore).
//!
//! Problems are recovered locally:
//! - a bad row is skipped, counted, and logged with its row number
//! - an unreadable source contributes zero samples and is recorded in the
//!   [`IngestReport`]; remaining sources are still read
//!
//! Neither case aborts ingestion.

mod backend;
mod delimited;

pub use backend::{ingest_query_result, BackendIngestSummary};
pub use delimited::{ingest_files, ingest_reader, ValueField, TIMESTAMP_FORMAT, VALUE_FIELDS};

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The row could not be split into fields.
    Malformed(String),
    /// The timestamp field is missing or empty.
    MissingTimestamp,
    /// The timestamp could not be parsed.
    InvalidTimestamp(String),
    /// No recognized value column exists.
    NoValueField,
    /// The selected value field is empty.
    MissingValue,
    /// The selected value could not be parsed.
    InvalidValue(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed row: {e}"),
            Self::MissingTimestamp => f.write_str("missing timestamp"),
            Self::InvalidTimestamp(raw) => write!(f, "invalid timestamp '{raw}'"),
            Self::NoValueField => f.write_str("no recognized value column"),
            Self::MissingValue => f.write_str("missing value"),
            Self::InvalidValue(raw) => write!(f, "invalid value '{raw}'"),
        }
    }
}

/// Outcome for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SourceStatus {
    /// The source was read (rows may still have been skipped).
    Read,
    /// The source could not be opened or read.
    Unavailable(String),
}

/// Per-source ingestion counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    /// Source path.
    pub path: PathBuf,
    /// Rows accepted into the store.
    pub rows_read: usize,
    /// Rows skipped.
    pub rows_skipped: usize,
    /// Source outcome.
    pub status: SourceStatus,
}

/// Summary of one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Per-source results in input order.
    pub sources: Vec<SourceReport>,
}

impl IngestReport {
    /// Rows accepted across all sources.
    #[must_use]
    pub fn total_read(&self) -> usize {
        self.sources.iter().map(|s| s.rows_read).sum()
    }

    /// Rows skipped across all sources.
    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.sources.iter().map(|s| s.rows_skipped).sum()
    }

    /// Sources that could not be read.
    #[must_use]
    pub fn unavailable(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Unavailable(_)))
            .count()
    }
}
