//! Prometheus HTTP client.
//!
//! Every call is a single GET with a bearer token and a per-call timeout.
//! Failed calls are returned to the caller as [`BackendError`]; nothing is
//! retried here.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, StatusCode, Url};

use super::config::{ClientConfig, CONNECTION_PROBE, QUERY_PATH, QUERY_RANGE_PATH};
use super::types::ApiResponse;
use crate::config::{BackendSettings, SecretString};
use crate::error::BackendError;
use crate::traits::{MetricsBackend, QueryResult, QueryStatus, RangeQuery, RawSeries};

/// Timestamp format sent to the API.
const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Prometheus API client.
#[derive(Debug)]
pub struct PrometheusClient {
    client: Client,
    token: SecretString,
    config: ClientConfig,
}

impl PrometheusClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Network`] if the HTTP client cannot be built.
    pub fn new(token: SecretString, config: ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()
            .map_err(|e| BackendError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            token,
            config,
        })
    }

    /// Create a client from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Network`] if the HTTP client cannot be built.
    pub fn from_settings(settings: &BackendSettings) -> Result<Self, BackendError> {
        Self::new(settings.token.clone(), ClientConfig::from(settings))
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Query parameters for a range query.
    ///
    /// The API treats `end` as inclusive, so the half-open window
    /// `[start, end)` is sent as `start ..= end - 1s`.
    #[must_use]
    pub fn range_params(query: &RangeQuery) -> Vec<(&'static str, String)> {
        let inclusive_end = query.end - TimeDelta::seconds(1);
        vec![
            ("query", query.rendered_expression()),
            ("start", query.start.format(API_TIME_FORMAT).to_string()),
            ("end", inclusive_end.format(API_TIME_FORMAT).to_string()),
            ("step", format!("{}h", query.step_hours)),
        ]
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, BackendError> {
        let raw = format!("{}{path}", self.config.base_url);
        Url::parse_with_params(&raw, params).map_err(|e| BackendError::Network {
            message: format!("Invalid URL {raw}: {e}"),
        })
    }

    async fn get(&self, url: Url) -> Result<ApiResponse, BackendError> {
        let started = Instant::now();
        tracing::debug!(url = %url.path(), "Sending Prometheus request");

        let response = self
            .client
            .get(url.clone())
            .header("Authorization", self.token.bearer_header())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::AuthenticationFailed);
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;
        tracing::debug!(
            url = %url.path(),
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "Prometheus response received"
        );

        // Error envelopes arrive with 4xx/5xx statuses; prefer their message.
        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(parsed) if parsed.status == QueryStatus::Error => Err(BackendError::QueryRejected {
                error_type: parsed.error_type.unwrap_or_else(|| "unknown".into()),
                message: parsed.error.unwrap_or_default(),
            }),
            Ok(parsed) if status.is_success() => Ok(parsed),
            Ok(_) => Err(BackendError::UnexpectedResponse {
                message: format!("Status {status}"),
            }),
            Err(e) if status.is_success() => Err(BackendError::UnexpectedResponse {
                message: format!("Invalid response body: {e}"),
            }),
            Err(_) => Err(BackendError::UnexpectedResponse {
                message: format!("Status {status}: {}", truncate(&body, 200)),
            }),
        }
    }

    fn transport_error(&self, e: &reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            BackendError::Network {
                message: e.to_string(),
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

/// True when any series has no point at `start`, the first evaluation
/// instant of a range query, so its data begins inside the window.
fn starts_late(series: &[RawSeries], start: DateTime<Utc>) -> bool {
    #[allow(clippy::cast_precision_loss)]
    let threshold = start.timestamp() as f64;
    series
        .iter()
        .filter_map(|s| s.values.first())
        .any(|first| first.0 > threshold)
}

fn into_result(response: ApiResponse) -> QueryResult {
    let series = response
        .data
        .map(super::types::ApiData::into_series)
        .unwrap_or_default();
    QueryResult {
        warnings: response.warnings,
        ..QueryResult::success(series)
    }
}

#[async_trait]
impl MetricsBackend for PrometheusClient {
    async fn query_range(&self, query: &RangeQuery) -> Result<QueryResult, BackendError> {
        let url = self.endpoint(QUERY_RANGE_PATH, &Self::range_params(query))?;
        let mut result = into_result(self.get(url).await?);

        if query.filter_incomplete {
            result.incomplete = starts_late(&result.series, query.start);
        }
        Ok(result)
    }

    async fn query_instant(&self, expression: &str) -> Result<QueryResult, BackendError> {
        let url = self.endpoint(QUERY_PATH, &[("query", expression.to_string())])?;
        Ok(into_result(self.get(url).await?))
    }

    async fn check_connection(&self) -> bool {
        match self.query_instant(CONNECTION_PROBE).await {
            Ok(result) => {
                tracing::info!(
                    url = %self.config.base_url,
                    series = result.series.len(),
                    "Connected to Prometheus"
                );
                true
            }
            Err(e) => {
                tracing::error!(url = %self.config.base_url, error = %e, "Connection check failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::traits::RawPoint;
    use crate::window::TimeWindow;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "sha256~test-token-123";

    fn create_client(server: &MockServer) -> PrometheusClient {
        let config = ClientConfig::new(server.uri()).with_timeout_ms(2_000);
        PrometheusClient::new(SecretString::new(TOKEN), config).unwrap()
    }

    fn day_query() -> RangeQuery {
        let window = TimeWindow::new(
            0,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap(),
            "Day 1",
        );
        RangeQuery::for_window("avg_over_time(b[{range}])", &window).with_step_hours(24)
    }

    fn matrix(values: serde_json::Value) -> serde_json::Value {
        json!({
            "status": "success",
            "data": {"resultType": "matrix", "result": [{"metric": {}, "values": values}]}
        })
    }

    #[test]
    fn test_range_params_half_open_end() {
        let params = PrometheusClient::range_params(&day_query());
        assert_eq!(
            params,
            vec![
                ("query", "avg_over_time(b[1h])".to_string()),
                ("start", "2024-01-15T00:00:00Z".to_string()),
                ("end", "2024-01-15T23:59:59Z".to_string()),
                ("step", "24h".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_query_range_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUERY_RANGE_PATH))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .and(query_param("step", "24h"))
            .and(query_param("end", "2024-01-15T23:59:59Z"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(matrix(json!([[1_705_276_800, "1024"]]))),
            )
            .mount(&server)
            .await;

        let client = create_client(&server);
        let result = client.query_range(&day_query()).await.unwrap();

        assert_eq!(result.status, QueryStatus::Success);
        assert_eq!(result.series[0].values, vec![RawPoint(1_705_276_800.0, "1024".into())]);
        assert!(!result.incomplete);
    }

    #[tokio::test]
    async fn test_empty_matrix_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUERY_RANGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"resultType": "matrix", "result": []}
            })))
            .mount(&server)
            .await;

        let result = create_client(&server).query_range(&day_query()).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = create_client(&server)
            .query_range(&day_query())
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn test_error_envelope_maps_to_query_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "errorType": "bad_data",
                "error": "1:15: parse error"
            })))
            .mount(&server)
            .await;

        let err = create_client(&server)
            .query_range(&day_query())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::QueryRejected {
                error_type: "bad_data".into(),
                message: "1:15: parse error".into()
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_maps_to_unexpected_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = create_client(&server)
            .query_instant("up")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::UnexpectedResponse { message } if message.contains("502")));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(matrix(json!([])))
                    .set_delay(Duration::from_millis(1_500)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new(server.uri()).with_timeout_ms(200);
        let client = PrometheusClient::new(SecretString::new(TOKEN), config).unwrap();
        let err = client.query_range(&day_query()).await.unwrap_err();
        assert_eq!(err, BackendError::Timeout { timeout_ms: 200 });
    }

    #[tokio::test]
    async fn test_incomplete_flag_when_series_starts_late() {
        let server = MockServer::start().await;
        // Window starts 2024-01-15T00:00Z; first point is two days later.
        Mock::given(method("GET"))
            .and(path(QUERY_RANGE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(matrix(json!([[1_705_449_600, "5"]]))),
            )
            .mount(&server)
            .await;

        let client = create_client(&server);
        let flagged = client
            .query_range(&day_query().with_filter_incomplete(true))
            .await
            .unwrap();
        assert!(flagged.incomplete);

        let unflagged = client.query_range(&day_query()).await.unwrap();
        assert!(!unflagged.incomplete);
    }

    #[tokio::test]
    async fn test_daily_window_flagged_when_data_starts_within_it() {
        let server = MockServer::start().await;
        // Day window 2024-01-15T00:00Z with a 24h step; data begins at 23:00.
        Mock::given(method("GET"))
            .and(path(QUERY_RANGE_PATH))
            .and(query_param("step", "24h"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(matrix(json!([[1_705_359_600, "5"]]))),
            )
            .mount(&server)
            .await;

        let query = day_query().with_filter_incomplete(true);
        assert_eq!(query.step_hours, 24);
        let result = create_client(&server).query_range(&query).await.unwrap();
        assert!(result.incomplete);
    }

    #[tokio::test]
    async fn test_daily_window_complete_when_point_at_start() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUERY_RANGE_PATH))
            .and(query_param("step", "24h"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(matrix(json!([[1_705_276_800, "5"]]))),
            )
            .mount(&server)
            .await;

        let result = create_client(&server)
            .query_range(&day_query().with_filter_incomplete(true))
            .await
            .unwrap();
        assert!(!result.incomplete);
    }

    #[tokio::test]
    async fn test_check_connection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUERY_PATH))
            .and(query_param("query", CONNECTION_PROBE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"resultType": "vector", "result": [
                    {"metric": {"__name__": "up", "job": "prometheus"}, "value": [1_705_276_800, "1"]}
                ]}
            })))
            .mount(&server)
            .await;

        assert!(create_client(&server).check_connection().await);
    }

    #[tokio::test]
    async fn test_check_connection_fails_on_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(!create_client(&server).check_connection().await);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
