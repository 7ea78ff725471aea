//! Structured "no data" and "query failed" diagnostics.
//!
//! [`ErrorInfo`] travels through the pipeline as data: an empty backend
//! result or a failed backend call for one window becomes an `ErrorInfo`
//! that the report renderer prints instead of a table.

use serde::{Deserialize, Serialize};

use super::BackendError;

/// Category of a backend failure, used to pick recovery suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request timeout.
    Timeout,
    /// Authentication failure.
    Authentication,
    /// Connection or transport failure.
    Network,
    /// The backend rejected the query.
    InvalidQuery,
    /// The query succeeded but returned no series.
    NoData,
    /// Other/unknown error.
    Other,
}

/// Actionable description of why a window has no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable summary.
    pub message: String,
    /// Ordered recovery suggestions.
    pub suggestions: Vec<String>,
    /// Where the condition was observed (query, time range).
    pub context: String,
}

impl ErrorInfo {
    /// Create a diagnostic with no suggestions.
    #[must_use]
    pub fn new(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: Vec::new(),
            context: context.into(),
        }
    }

    /// Append suggestions, keeping their order.
    #[must_use]
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions
            .extend(suggestions.into_iter().map(Into::into));
        self
    }

    /// Diagnostic for a successful query that returned zero series.
    ///
    /// `metric_suggestions` come first, followed by the generic time-range
    /// checks that apply to every metric.
    #[must_use]
    pub fn no_data(metric: &str, context: impl Into<String>, metric_suggestions: &[String]) -> Self {
        Self::new(
            format!("No data found for metric \"{metric}\" in the specified time range"),
            context,
        )
        .with_suggestions(metric_suggestions.iter().cloned())
        .with_suggestions(suggestions_for(ErrorCategory::NoData).iter().copied())
    }

    /// Diagnostic for a failed backend call.
    #[must_use]
    pub fn from_backend_error(error: &BackendError, context: impl Into<String>) -> Self {
        Self::new(format!("Query failed: {error}"), context)
            .with_suggestions(suggestions_for(error.category()).iter().copied())
    }
}

/// Recovery suggestions per category.
fn suggestions_for(category: ErrorCategory) -> &'static [&'static str] {
    match category {
        ErrorCategory::Authentication => &[
            "Token may have expired, get a new one: oc whoami -t",
            "Ensure you are logged into the correct cluster",
            "Check that your user has monitoring permissions",
        ],
        ErrorCategory::Timeout => &[
            "Increase REQUEST_TIMEOUT_MS",
            "Reduce the number of days analyzed",
        ],
        ErrorCategory::Network => &[
            "Check that the Prometheus URL is correct and reachable",
            "Verify you are connected to the cluster network or VPN",
        ],
        ErrorCategory::InvalidQuery => &[
            "Verify the metric name is correct",
            "Check the query expression syntax",
        ],
        ErrorCategory::NoData => &[
            "Verify the date range contains data",
            "Check if the time range is too far in the past (data retention)",
        ],
        ErrorCategory::Other => &["Retry the analysis; the backend may be temporarily unavailable"],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_data_orders_metric_suggestions_first() {
        let info = ErrorInfo::no_data(
            "bucket_used_bytes",
            "2024-01-15T00:00:00Z to 2024-01-16T00:00:00Z",
            &["Verify the bucket name is correct".to_string()],
        );

        assert!(info.message.contains("bucket_used_bytes"));
        assert_eq!(
            info.suggestions,
            vec![
                "Verify the bucket name is correct".to_string(),
                "Verify the date range contains data".to_string(),
                "Check if the time range is too far in the past (data retention)".to_string(),
            ]
        );
        assert_eq!(
            info.context,
            "2024-01-15T00:00:00Z to 2024-01-16T00:00:00Z"
        );
    }

    #[test]
    fn test_from_backend_error_authentication() {
        let info = ErrorInfo::from_backend_error(&BackendError::AuthenticationFailed, "up");
        assert!(info.message.starts_with("Query failed: Authentication failed"));
        assert_eq!(info.suggestions.len(), 3);
        assert!(info.suggestions[0].contains("oc whoami -t"));
    }

    #[test]
    fn test_serialization_roundtrip_field_names() {
        let info = ErrorInfo::new("empty", "ctx").with_suggestions(["a", "b"]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["message"], "empty");
        assert_eq!(json["suggestions"][1], "b");
        assert_eq!(json["context"], "ctx");
    }
}
