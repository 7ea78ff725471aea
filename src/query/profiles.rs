//! Metric definitions and the hub/spoke analysis profiles.

use serde::Serialize;

use crate::series::UnitKind;

/// Default object bucket analyzed by the hub profile.
pub const DEFAULT_BUCKET: &str = "observability";

/// Namespace running the observability stack on a hub cluster.
pub const HUB_NAMESPACE: &str = "open-cluster-management-observability";

/// Namespace running the observability add-on on a spoke cluster.
pub const SPOKE_NAMESPACE: &str = "open-cluster-management-addon-observability";

/// Placeholder replaced by the range selector, e.g. `[{range}]` -> `[1h]`.
pub const RANGE_PLACEHOLDER: &str = "{range}";

/// Which cluster role to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Hub cluster: bucket usage plus observability namespace resources.
    #[default]
    Hub,
    /// Spoke cluster: add-on namespace resources.
    Spoke,
}

impl Profile {
    /// Metrics for this profile.
    #[must_use]
    pub fn metrics(self, bucket: &str) -> Vec<MetricSpec> {
        match self {
            Self::Hub => hub_metrics(bucket),
            Self::Spoke => spoke_metrics(),
        }
    }
}

/// One metric to query: display name, expression template, and unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSpec {
    /// Display name; also used in artifact file names.
    pub name: String,
    /// Expression with a [`RANGE_PLACEHOLDER`] for the range selector.
    pub expression: String,
    /// Quantity kind of the result.
    pub unit_kind: UnitKind,
    /// Range selector width for daily windows, in hours.
    pub range_hours: u32,
    /// Metric-specific hints shown when a window has no data.
    pub suggestions: Vec<String>,
}

impl MetricSpec {
    /// Create a metric with a 1-hour range selector and no suggestions.
    #[must_use]
    pub fn new(name: impl Into<String>, expression: impl Into<String>, unit_kind: UnitKind) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            unit_kind,
            range_hours: 1,
            suggestions: Vec::new(),
        }
    }

    /// Set the daily range selector width.
    #[must_use]
    pub const fn with_range_hours(mut self, range_hours: u32) -> Self {
        self.range_hours = range_hours;
        self
    }

    /// Append no-data suggestions.
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

    /// Expression with the range selector set to `hours`.
    #[must_use]
    pub fn expression_for_range(&self, hours: u32) -> String {
        self.expression
            .replace(RANGE_PLACEHOLDER, &format!("{hours}h"))
    }
}

/// Object bucket usage in bytes.
#[must_use]
pub fn bucket_usage(bucket: &str) -> MetricSpec {
    let bucket = bucket.trim();
    MetricSpec::new(
        format!("{bucket} bucket used bytes"),
        format!("avg_over_time(NooBaa_bucket_used_bytes{{bucket_name=\"{bucket}\"}}[{RANGE_PLACEHOLDER}])"),
        UnitKind::Bytes,
    )
    .with_suggestions([
        "Verify the bucket name is correct",
        "Check if the bucket exists in NooBaa/OpenShift Data Foundation",
        "Ensure bucket monitoring is enabled",
    ])
}

/// CPU, memory, and network transmit for every container in `namespace`.
#[must_use]
pub fn namespace_metrics(namespace: &str) -> Vec<MetricSpec> {
    let namespace = namespace.trim();
    let hints = [
        format!("Verify the namespace \"{namespace}\" exists"),
        "Check that cluster monitoring scrapes container metrics".to_string(),
    ];
    vec![
        MetricSpec::new(
            format!("{namespace} cpu usage"),
            format!(
                "sum(rate(container_cpu_usage_seconds_total{{namespace=\"{namespace}\",container!=\"\"}}[{RANGE_PLACEHOLDER}]))"
            ),
            UnitKind::CpuSeconds,
        )
        .with_suggestions(hints.clone()),
        MetricSpec::new(
            format!("{namespace} memory working set"),
            format!(
                "sum(avg_over_time(container_memory_working_set_bytes{{namespace=\"{namespace}\",container!=\"\"}}[{RANGE_PLACEHOLDER}]))"
            ),
            UnitKind::Bytes,
        )
        .with_suggestions(hints.clone()),
        MetricSpec::new(
            format!("{namespace} network transmit"),
            format!(
                "sum(rate(container_network_transmit_bytes_total{{namespace=\"{namespace}\"}}[{RANGE_PLACEHOLDER}]))"
            ),
            UnitKind::BytesPerSecond,
        )
        .with_suggestions(hints),
    ]
}

/// Hub profile: bucket usage followed by the observability namespace.
#[must_use]
pub fn hub_metrics(bucket: &str) -> Vec<MetricSpec> {
    let mut metrics = vec![bucket_usage(bucket)];
    metrics.extend(namespace_metrics(HUB_NAMESPACE));
    metrics
}

/// Spoke profile: the observability add-on namespace.
#[must_use]
pub fn spoke_metrics() -> Vec<MetricSpec> {
    namespace_metrics(SPOKE_NAMESPACE)
}
