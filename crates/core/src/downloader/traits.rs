//! Trait definitions for the download runner.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::DownloaderError;
use super::types::{DownloadProgress, DownloadRequest, DownloadResult};

/// Something that can fetch a magnet link into a directory.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Returns the name of this downloader implementation.
    fn name(&self) -> &str;

    /// Runs the download to completion.
    ///
    /// Progress updates are sent with `try_send`; a full or closed channel
    /// never slows the download down.
    async fn download(
        &self,
        request: DownloadRequest,
        progress_tx: Option<mpsc::Sender<DownloadProgress>>,
    ) -> Result<DownloadResult, DownloaderError>;

    /// Validates that the downloader is installed and ready.
    async fn validate(&self) -> Result<(), DownloaderError>;
}
