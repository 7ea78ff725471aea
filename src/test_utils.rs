//! Test utilities and mock factories.
//!
//! This module provides shared testing infrastructure:
//! - Mock backends with canned responses
//! - Query-result fixtures
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};

use crate::error::BackendError;
use crate::traits::{MockMetricsBackend, QueryResult, RawPoint, RawSeries};

/// Fixed start instant used across tests: 2024-01-15 00:00:00 UTC.
#[must_use]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
}

/// A successful result holding one series with one point.
#[must_use]
pub fn one_point(at: DateTime<Utc>, value: &str) -> QueryResult {
    #[allow(clippy::cast_precision_loss)]
    let seconds = at.timestamp() as f64;
    QueryResult::success(vec![RawSeries {
        labels: std::collections::BTreeMap::default(),
        values: vec![RawPoint(seconds, value.to_string())],
    }])
}

/// A backend whose every range query returns an empty result.
#[must_use]
pub fn mock_backend_empty() -> MockMetricsBackend {
    let mut mock = MockMetricsBackend::new();
    mock.expect_query_range()
        .returning(|_| Ok(QueryResult::empty()));
    mock.expect_query_instant()
        .returning(|_| Ok(QueryResult::empty()));
    mock.expect_check_connection().returning(|| true);
    mock
}

/// A backend whose every call fails with `error`.
#[must_use]
pub fn mock_backend_error(error: BackendError) -> MockMetricsBackend {
    let mut mock = MockMetricsBackend::new();
    let range_error = error.clone();
    mock.expect_query_range()
        .returning(move |_| Err(range_error.clone()));
    mock.expect_query_instant()
        .returning(move |_| Err(error.clone()));
    mock.expect_check_connection().returning(|| false);
    mock
}
