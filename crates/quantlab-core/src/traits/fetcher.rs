//! Archive fetcher trait definitions.

use crate::error::FetchError;
use crate::types::DataRequest;
use async_trait::async_trait;
use std::path::PathBuf;

/// Trait for sources that materialise historical archive files locally.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Ensure every file covered by the request is present in the local cache.
    ///
    /// # Returns
    /// The local path of every requested file in date order, including
    /// files that could not be downloaded (they are absent on disk).
    async fn ensure_downloaded(&self, request: &DataRequest) -> Result<Vec<PathBuf>, FetchError>;

    /// Get the fetcher name.
    fn name(&self) -> &str;
}
