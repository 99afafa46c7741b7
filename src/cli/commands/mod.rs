//! CLI command implementations.

pub mod detectors;
pub mod fetch;
pub mod ingest;
pub mod label;
pub mod query_open;
pub mod signals;
pub mod validate;

use anyhow::{Context, Result};
use quantlab_config::DataSettings;
use quantlab_data::{ApiClient, ClientConfig};

/// HTTP client for the configured archive source.
pub(crate) fn api_client(settings: &DataSettings) -> Result<ApiClient> {
    let config = ClientConfig::new(settings.base_url.clone())
        .with_timeout(settings.timeout_secs)
        .with_retries(settings.total_retries, settings.backoff_factor);
    ApiClient::new(config).context("Failed to build HTTP client")
}
