//! Trait definitions for mockable dependencies.
//!
//! This module defines:
//! - [`MetricsBackend`]: the time-series query service abstraction
//!
//! It also re-exports the shared query types from the `types` submodule.
//!
//! # Mocking
//!
//! [`MetricsBackend`] is annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates `MockMetricsBackend` for unit tests.

mod types;

pub use types::{QueryResult, QueryStatus, RangeQuery, RawPoint, RawSeries};

use async_trait::async_trait;

use crate::error::BackendError;

/// Time-series query service.
///
/// Implementations own transport, authentication, and per-call timeouts.
/// Callers supply only the expression and the time window; they never
/// build or validate the query language themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Evaluate an expression over a half-open window at a fixed step.
    ///
    /// A query that matches nothing is `Ok` with an empty [`QueryResult`].
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport, authentication, or query
    /// rejection failures.
    async fn query_range(&self, query: &RangeQuery) -> Result<QueryResult, BackendError>;

    /// Evaluate an expression at the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport, authentication, or query
    /// rejection failures.
    async fn query_instant(&self, expression: &str) -> Result<QueryResult, BackendError>;

    /// Returns true if the backend answers a trivial query.
    async fn check_connection(&self) -> bool;
}
