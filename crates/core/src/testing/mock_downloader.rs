//! Mock downloader for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};

use crate::downloader::{
    DownloadProgress, DownloadRequest, DownloadResult, Downloader, DownloaderError, ProgressFilter,
};

/// Mock implementation of the Downloader trait.
///
/// A successful download creates the target directory and writes the
/// configured files into it. Progress lines go through the real
/// [`ProgressFilter`], so noise in them is dropped the same way.
#[derive(Debug, Clone)]
pub struct MockDownloader {
    requests: Arc<RwLock<Vec<DownloadRequest>>>,
    next_error: Arc<RwLock<Option<DownloaderError>>>,
    validate_error: Arc<RwLock<Option<DownloaderError>>>,
    /// Files written into the target directory as (relative path, contents).
    files: Arc<RwLock<Vec<(String, Vec<u8>)>>>,
    progress_lines: Arc<RwLock<Vec<String>>>,
    delay_ms: Arc<RwLock<u64>>,
    /// Never finish; only an interrupt ends the download.
    hang: Arc<RwLock<bool>>,
    panic_message: Arc<RwLock<Option<String>>>,
}

impl Default for MockDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDownloader {
    /// Create a mock that downloads a single small file.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            validate_error: Arc::new(RwLock::new(None)),
            files: Arc::new(RwLock::new(vec![(
                "payload.bin".to_string(),
                b"mock torrent payload".to_vec(),
            )])),
            progress_lines: Arc::new(RwLock::new(Vec::new())),
            delay_ms: Arc::new(RwLock::new(0)),
            hang: Arc::new(RwLock::new(false)),
            panic_message: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<DownloadRequest> {
        self.requests.read().await.clone()
    }

    pub async fn download_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Configure the next download to fail with the given error.
    pub async fn set_next_error(&self, error: DownloaderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Configure `validate` to fail with the given error.
    pub async fn set_validate_error(&self, error: DownloaderError) {
        *self.validate_error.write().await = Some(error);
    }

    /// Replace the files a successful download writes. An empty list leaves
    /// an empty target directory.
    pub async fn set_files(&self, files: Vec<(String, Vec<u8>)>) {
        *self.files.write().await = files;
    }

    /// Raw engine lines to feed through the progress filter.
    pub async fn set_progress_lines(&self, lines: Vec<String>) {
        *self.progress_lines.write().await = lines;
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay_ms.write().await = delay.as_millis() as u64;
    }

    pub async fn set_hang(&self, hang: bool) {
        *self.hang.write().await = hang;
    }

    /// Make the next download panic with `message`.
    pub async fn set_panic(&self, message: &str) {
        *self.panic_message.write().await = Some(message.to_string());
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn download(
        &self,
        request: DownloadRequest,
        progress_tx: Option<mpsc::Sender<DownloadProgress>>,
    ) -> Result<DownloadResult, DownloaderError> {
        let started = Instant::now();
        self.requests.write().await.push(request.clone());

        tokio::fs::create_dir_all(&request.target_dir)
            .await
            .map_err(|e| DownloaderError::DirectoryCreationFailed {
                path: request.target_dir.clone(),
                source: e,
            })?;

        let mut filter = ProgressFilter::new();
        let mut progress_updates = 0;
        for line in self.progress_lines.read().await.iter() {
            if let Some(progress) = filter.accept(line) {
                progress_updates += 1;
                if let Some(ref tx) = progress_tx {
                    let _ = tx.try_send(progress);
                }
            }
        }

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if *self.hang.read().await {
            std::future::pending::<()>().await;
        }

        let panic_message = self.panic_message.write().await.take();
        if let Some(message) = panic_message {
            panic!("{}", message);
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        for (name, contents) in self.files.read().await.iter() {
            let path = request.target_dir.join(name);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, contents).await?;
        }

        Ok(DownloadResult {
            target_dir: request.target_dir,
            duration_ms: started.elapsed().as_millis() as u64,
            progress_updates,
        })
    }

    async fn validate(&self) -> Result<(), DownloaderError> {
        match self.validate_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
