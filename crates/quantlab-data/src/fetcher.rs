//! Binance Vision daily archive fetcher.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use quantlab_core::error::FetchError;
use quantlab_core::traits::ArchiveFetcher;
use quantlab_core::types::DataRequest;
use tracing::{debug, info, warn};

use crate::client::ApiClient;

/// Public root of the daily spot archives.
pub const BINANCE_VISION_URL: &str = "https://data.binance.vision/data/spot/daily/";

/// Mirrors daily ZIP archives into a local directory.
///
/// Local paths mirror the remote layout, so a file that already exists on
/// disk is never downloaded again.
pub struct BinanceVisionFetcher {
    client: ApiClient,
    download_dir: PathBuf,
    max_concurrent_downloads: usize,
}

impl BinanceVisionFetcher {
    pub fn new(client: ApiClient, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            download_dir: download_dir.into(),
            max_concurrent_downloads: 4,
        }
    }

    pub fn with_max_concurrent_downloads(mut self, max: usize) -> Self {
        self.max_concurrent_downloads = max.max(1);
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Archive endpoint for one day of a request, relative to the base URL.
    pub fn endpoint(request: &DataRequest, day: NaiveDate) -> String {
        let date = day.format("%Y-%m-%d");
        match request {
            DataRequest::Klines(r) => format!(
                "klines/{sym}/{int}/{sym}-{int}-{date}.zip",
                sym = r.symbol,
                int = r.interval,
                date = date
            ),
            DataRequest::Trades(r) => format!(
                "trades/{sym}/{sym}-trades-{date}.zip",
                sym = r.symbol,
                date = date
            ),
        }
    }

    async fn download_one(&self, endpoint: &str, path: &Path) {
        if path.exists() {
            debug!(path = %path.display(), "Archive already cached");
            return;
        }

        match self.client.get_bytes(endpoint).await {
            Ok(Some(bytes)) => match write_atomic(path, &bytes).await {
                Ok(()) => info!(path = %path.display(), bytes = bytes.len(), "Downloaded archive"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to write archive"),
            },
            Ok(None) => warn!(endpoint, "Archive not available"),
            Err(e) => warn!(endpoint, error = %e, "Archive download failed"),
        }
    }
}

#[async_trait]
impl ArchiveFetcher for BinanceVisionFetcher {
    async fn ensure_downloaded(&self, request: &DataRequest) -> Result<Vec<PathBuf>, FetchError> {
        let jobs: Vec<(String, PathBuf)> = request
            .days()
            .map(|day| {
                let endpoint = Self::endpoint(request, day);
                let path = self.download_dir.join(&endpoint);
                (endpoint, path)
            })
            .collect();

        info!(
            request = request.name(),
            symbol = request.symbol(),
            kind = request.kind().as_str(),
            days = jobs.len(),
            "Ensuring archives"
        );

        let paths = stream::iter(jobs)
            .map(|(endpoint, path)| async move {
                self.download_one(&endpoint, &path).await;
                path
            })
            .buffered(self.max_concurrent_downloads)
            .collect::<Vec<_>>()
            .await;

        Ok(paths)
    }

    fn name(&self) -> &str {
        "binance-vision"
    }
}

/// Write through a `.part` file so a partial download never sits at `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    tokio::fs::write(&partial, bytes).await?;
    tokio::fs::rename(&partial, path).await
}
