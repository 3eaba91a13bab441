//! Mock uploader for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::uploader::{UploadResult, Uploader, UploaderError};

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub path: PathBuf,
    /// Whether the file existed when the upload started.
    pub file_existed: bool,
    pub success: bool,
}

/// Mock implementation of the Uploader trait.
#[derive(Debug, Clone)]
pub struct MockUploader {
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    next_error: Arc<RwLock<Option<UploaderError>>>,
    validate_error: Arc<RwLock<Option<UploaderError>>>,
    /// Base of generated download pages; the file id is appended.
    page_base: Arc<RwLock<String>>,
    hang: Arc<RwLock<bool>>,
}

impl Default for MockUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUploader {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            validate_error: Arc::new(RwLock::new(None)),
            page_base: Arc::new(RwLock::new("https://gofile.io/d/".to_string())),
            hang: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Configure the next upload to fail with the given error.
    pub async fn set_next_error(&self, error: UploaderError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn set_validate_error(&self, error: UploaderError) {
        *self.validate_error.write().await = Some(error);
    }

    pub async fn set_page_base(&self, base: &str) {
        *self.page_base.write().await = base.to_string();
    }

    pub async fn set_hang(&self, hang: bool) {
        *self.hang.write().await = hang;
    }
}

#[async_trait]
impl Uploader for MockUploader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, path: &Path) -> Result<UploadResult, UploaderError> {
        let metadata = tokio::fs::metadata(path).await.ok();
        let file_existed = metadata.as_ref().map(|m| m.is_file()).unwrap_or(false);

        if *self.hang.read().await {
            std::future::pending::<()>().await;
        }

        let error = match self.next_error.write().await.take() {
            Some(err) => Some(err),
            None if !file_existed => Some(UploaderError::FileNotFound {
                path: path.to_path_buf(),
            }),
            None => None,
        };

        self.uploads.write().await.push(RecordedUpload {
            path: path.to_path_buf(),
            file_existed,
            success: error.is_none(),
        });

        if let Some(err) = error {
            return Err(err);
        }

        let count = self.uploads.read().await.len();
        let file_id = format!("mock{:04}", count);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(UploadResult {
            download_page: format!("{}{}", self.page_base.read().await, file_id),
            file_id: Some(file_id),
            file_name,
            size_bytes: metadata.map(|m| m.len()).unwrap_or(0),
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<(), UploaderError> {
        match self.validate_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
