//! HTTP client with retry and backoff.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quantlab_core::error::FetchError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Statuses worth another attempt.
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint is joined to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub total_retries: u32,
    /// Backoff factor in seconds; retry n waits factor * 2^(n-1)
    pub backoff_factor: f64,
    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 10,
            total_retries: 3,
            backoff_factor: 0.5,
            headers: HashMap::new(),
        }
    }

    pub fn with_retries(mut self, total_retries: u32, backoff_factor: f64) -> Self {
        self.total_retries = total_retries;
        self.backoff_factor = backoff_factor;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Generic GET client for a single base URL.
///
/// A 404 response is reported as `Ok(None)`: for archive downloads a missing
/// file is an expected outcome, not a failure.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    total_retries: u32,
    backoff_factor: f64,
}

impl ApiClient {
    /// Build a client. Fails when a configured header is invalid.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Network {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            total_retries: config.total_retries,
            backoff_factor: config.backoff_factor,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint relative to the base URL.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Delay before retry `retry` (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16) as i32;
        Duration::try_from_secs_f64(self.backoff_factor * 2f64.powi(exponent)).unwrap_or(Duration::ZERO)
    }

    /// GET an endpoint and return the raw body.
    pub async fn get_bytes(&self, endpoint: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let url = self.url_for(endpoint);
        let attempts = self.total_retries + 1;
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.backoff(attempt - 1);
                debug!(url = %url, attempt, delay_ms = delay.as_millis() as u64, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            let started = Instant::now();
            let response = match self.client.get(&url).send().await {
                Ok(response) => response,
                Err(e) if e.is_builder() => {
                    return Err(FetchError::InvalidUrl {
                        url,
                        reason: e.to_string(),
                    });
                }
                Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                    warn!(url = %url, attempt, error = %e, "Request failed");
                    last_reason = e.to_string();
                    continue;
                }
                Err(e) => {
                    return Err(FetchError::Network {
                        url,
                        reason: e.to_string(),
                    });
                }
            };

            let status = response.status();
            debug!(
                method = "GET",
                url = %url,
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "HTTP request"
            );

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            if status.is_success() {
                let body = response.bytes().await.map_err(|e| FetchError::Network {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
                return Ok(Some(body.to_vec()));
            }

            if RETRY_STATUSES.contains(&status.as_u16()) {
                warn!(url = %url, attempt, status = status.as_u16(), "Retryable status");
                last_reason = format!("HTTP {}", status.as_u16());
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        Err(FetchError::Exhausted {
            url,
            attempts,
            reason: last_reason,
        })
    }

    /// GET an endpoint and decode the body as JSON.
    pub async fn get_json(&self, endpoint: &str) -> Result<Option<serde_json::Value>, FetchError> {
        let Some(body) = self.get_bytes(endpoint).await? else {
            return Ok(None);
        };

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| FetchError::Decode {
                url: self.url_for(endpoint),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubServer;

    fn fast_client(base_url: &str, retries: u32) -> ApiClient {
        ApiClient::new(ClientConfig::new(base_url).with_retries(retries, 0.0)).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = fast_client("https://example.com/data/", 0);
        assert_eq!(client.base_url(), "https://example.com/data");
        assert_eq!(client.url_for("/a/b.zip"), "https://example.com/data/a/b.zip");
        assert_eq!(client.url_for("a/b.zip"), "https://example.com/data/a/b.zip");
    }

    #[test]
    fn test_backoff_doubles() {
        let client =
            ApiClient::new(ClientConfig::new("http://localhost").with_retries(3, 0.5)).unwrap();
        assert_eq!(client.backoff(1), Duration::from_millis(500));
        assert_eq!(client.backoff(2), Duration::from_secs(1));
        assert_eq!(client.backoff(3), Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_without_usable_factor() {
        for factor in [f64::NAN, f64::INFINITY, -1.0] {
            let client =
                ApiClient::new(ClientConfig::new("http://localhost").with_retries(2, factor)).unwrap();
            assert_eq!(client.backoff(1), Duration::ZERO);
        }
    }

    #[test]
    fn test_invalid_header_rejected() {
        let config = ClientConfig::new("http://localhost").with_header("bad header", "x");
        assert!(matches!(
            ApiClient::new(config),
            Err(FetchError::InvalidHeader { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_bytes_success_and_missing() {
        let server = StubServer::start(vec![("/file.zip", vec![(200, b"payload".to_vec())])]).await;
        let client = fast_client(&server.base_url, 0);

        let body = client.get_bytes("file.zip").await.unwrap();
        assert_eq!(body.as_deref(), Some(&b"payload"[..]));

        let missing = client.get_bytes("other.zip").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let server = StubServer::start(vec![(
            "/flaky",
            vec![(503, Vec::new()), (503, Vec::new()), (200, b"ok".to_vec())],
        )])
        .await;
        let client = fast_client(&server.base_url, 3);

        let body = client.get_bytes("flaky").await.unwrap();
        assert_eq!(body.as_deref(), Some(&b"ok"[..]));
        assert_eq!(server.hits(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let server = StubServer::start(vec![("/down", vec![(502, Vec::new())])]).await;
        let client = fast_client(&server.base_url, 2);

        match client.get_bytes("down").await {
            Err(FetchError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected exhausted retries, got {:?}", other),
        }
        assert_eq!(server.hits(), 3);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = StubServer::start(vec![("/forbidden", vec![(403, b"denied".to_vec())])]).await;
        let client = fast_client(&server.base_url, 3);

        match client.get_bytes("forbidden").await {
            Err(FetchError::Status { status, body, .. }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "denied");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_get_json() {
        let server =
            StubServer::start(vec![("/status", vec![(200, br#"{"ok":true}"#.to_vec())])]).await;
        let client = fast_client(&server.base_url, 0);

        let value = client.get_json("status").await.unwrap().unwrap();
        assert_eq!(value["ok"], true);
    }
}
