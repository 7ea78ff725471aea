//! Prometheus HTTP API response bodies.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::traits::{QueryStatus, RawPoint, RawSeries};

/// Envelope returned by `/api/v1/query` and `/api/v1/query_range`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// `success` or `error`.
    pub status: QueryStatus,
    /// Result payload, absent on errors.
    #[serde(default)]
    pub data: Option<ApiData>,
    /// Error class such as `bad_data`.
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
    /// Error message.
    #[serde(default)]
    pub error: Option<String>,
    /// Non-fatal warnings.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Typed result payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
pub enum ApiData {
    /// Range query result.
    Matrix(Vec<MatrixSeries>),
    /// Instant query result.
    Vector(Vec<VectorSample>),
    /// Single scalar.
    Scalar(RawPoint),
    /// Single string.
    String(RawPoint),
}

/// One series of a matrix result.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixSeries {
    /// Series labels.
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    /// Points in time order.
    #[serde(default)]
    pub values: Vec<RawPoint>,
}

/// One element of a vector result.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorSample {
    /// Series labels.
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    /// The single point.
    pub value: RawPoint,
}

impl ApiData {
    /// Flatten any result type into labelled series.
    #[must_use]
    pub fn into_series(self) -> Vec<RawSeries> {
        match self {
            Self::Matrix(series) => series
                .into_iter()
                .map(|s| RawSeries {
                    labels: s.metric,
                    values: s.values,
                })
                .collect(),
            Self::Vector(samples) => samples
                .into_iter()
                .map(|s| RawSeries {
                    labels: s.metric,
                    values: vec![s.value],
                })
                .collect(),
            Self::Scalar(point) => vec![RawSeries {
                labels: BTreeMap::new(),
                values: vec![point],
            }],
            // A string result carries no numeric sample.
            Self::String(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_matrix() {
        let body = r#"{
            "status": "success",
            "data": {
                "resultType": "matrix",
                "result": [
                    {"metric": {"bucket_name": "observability"},
                     "values": [[1705276800, "1024"], [1705280400, "2048"]]}
                ]
            }
        }"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, QueryStatus::Success);
        let series = response.data.unwrap().into_series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].labels["bucket_name"], "observability");
        assert_eq!(series[0].values[1], RawPoint(1_705_280_400.0, "2048".into()));
    }

    #[test]
    fn test_parse_vector() {
        let body = r#"{"status":"success","data":{"resultType":"vector",
            "result":[{"metric":{"__name__":"up"},"value":[1705276800.123,"1"]}]}}"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        let series = response.data.unwrap().into_series();
        assert_eq!(series[0].values.len(), 1);
        assert_eq!(series[0].labels["__name__"], "up");
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"status":"error","errorType":"bad_data","error":"parse error at char 4"}"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, QueryStatus::Error);
        assert!(response.data.is_none());
        assert_eq!(response.error_type.as_deref(), Some("bad_data"));
    }
}
