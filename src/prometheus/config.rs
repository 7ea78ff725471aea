//! Prometheus client configuration.

use crate::config::{BackendSettings, DEFAULT_REQUEST_TIMEOUT_MS};

/// Path of the range query endpoint.
pub const QUERY_RANGE_PATH: &str = "/api/v1/query_range";
/// Path of the instant query endpoint.
pub const QUERY_PATH: &str = "/api/v1/query";
/// Expression used to probe connectivity.
pub const CONNECTION_PROBE: &str = "up";

/// Connection parameters for [`super::PrometheusClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
    /// Accept self-signed certificates.
    pub insecure_tls: bool,
}

impl ClientConfig {
    /// Configuration for `base_url` with default timeout and strict TLS.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            insecure_tls: false,
        }
    }

    /// Set timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Accept or reject self-signed certificates.
    #[must_use]
    pub const fn with_insecure_tls(mut self, insecure_tls: bool) -> Self {
        self.insecure_tls = insecure_tls;
        self
    }
}

impl From<&BackendSettings> for ClientConfig {
    fn from(settings: &BackendSettings) -> Self {
        Self::new(settings.url.clone())
            .with_timeout_ms(settings.timeout_ms)
            .with_insecure_tls(settings.insecure_tls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecretString;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("https://prom.example.com/");
        assert_eq!(config.base_url, "https://prom.example.com");
        assert!(!config.insecure_tls);
    }

    #[test]
    fn test_from_settings() {
        let settings = BackendSettings {
            url: "https://prom.example.com".into(),
            token: SecretString::new("sha256~abcdefghijk"),
            timeout_ms: 5_000,
            insecure_tls: true,
        };
        let config = ClientConfig::from(&settings);
        assert_eq!(config.timeout_ms, 5_000);
        assert!(config.insecure_tls);
    }
}
