//! Trait definitions for the uploader.

use async_trait::async_trait;
use std::path::Path;

use super::error::UploaderError;
use super::types::UploadResult;

/// Publishes a local file and returns where it can be fetched.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Returns the name of this uploader implementation.
    fn name(&self) -> &str;

    /// Uploads a file in a single request.
    async fn upload(&self, path: &Path) -> Result<UploadResult, UploaderError>;

    /// Validates that the uploader is properly configured.
    async fn validate(&self) -> Result<(), UploaderError>;
}
