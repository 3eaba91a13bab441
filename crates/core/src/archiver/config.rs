//! Configuration for the archiver.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the zip-based archiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiverConfig {
    /// Path to the zip binary.
    #[serde(default = "default_zip_path")]
    pub zip_path: PathBuf,

    /// Compression level 0-9; `None` leaves zip's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<u8>,
}

fn default_zip_path() -> PathBuf {
    PathBuf::from("zip")
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            zip_path: default_zip_path(),
            compression_level: None,
        }
    }
}

impl ArchiverConfig {
    /// Creates a config with a custom zip binary.
    pub fn with_binary(zip_path: impl Into<PathBuf>) -> Self {
        Self {
            zip_path: zip_path.into(),
            ..Default::default()
        }
    }
}
