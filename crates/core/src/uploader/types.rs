//! Types for the uploader.

use serde::{Deserialize, Serialize};

/// A completed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Shareable page where the file can be downloaded.
    pub download_page: String,
    /// Host-side file id, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub file_name: String,
    pub size_bytes: u64,
    pub duration_ms: u64,
}
