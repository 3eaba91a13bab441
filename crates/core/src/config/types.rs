use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::archiver::ArchiverConfig;
use crate::downloader::DownloaderConfig;
use crate::uploader::UploaderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub archiver: ArchiverConfig,
    #[serde(default)]
    pub uploader: UploaderConfig,
}

/// Filesystem roots used by a run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Each job downloads into `<download_root>/<label>`
    #[serde(default = "default_download_root")]
    pub download_root: PathBuf,
    /// Archives are written to `<archive_root>/<label>.zip`
    #[serde(default = "default_archive_root")]
    pub archive_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            download_root: default_download_root(),
            archive_root: default_archive_root(),
        }
    }
}

impl PathsConfig {
    /// Roots for both downloads and archives under a single base directory.
    pub fn under(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            download_root: base.join("downloads"),
            archive_root: base,
        }
    }
}

fn default_download_root() -> PathBuf {
    std::env::temp_dir().join("magnetdrop").join("downloads")
}

fn default_archive_root() -> PathBuf {
    std::env::temp_dir().join("magnetdrop")
}
