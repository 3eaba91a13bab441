//! Types for the download runner.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::magnet::MagnetLink;

/// A single download to run.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Link handed to the engine as-is.
    pub magnet: MagnetLink,
    /// Directory the engine writes into; created if absent.
    pub target_dir: PathBuf,
}

impl DownloadRequest {
    pub fn new(magnet: MagnetLink, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            magnet,
            target_dir: target_dir.into(),
        }
    }
}

/// Outcome of a download whose engine exited successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResult {
    /// Directory the engine wrote into.
    pub target_dir: PathBuf,
    /// Wall time of the run in milliseconds.
    pub duration_ms: u64,
    /// Number of progress updates that passed the filter.
    pub progress_updates: usize,
}

/// A progress line from the engine, plus whatever could be parsed out of it.
///
/// aria2 summaries look like
/// `[#2089b0 400.0KiB/33.2MiB(1%) CN:1 DL:115.7KiB ETA:4m51s]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// The line as it should be displayed.
    pub line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
    /// Peer connections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
    /// Engine reports the download finished and it is seeding.
    #[serde(default)]
    pub seeding: bool,
}
