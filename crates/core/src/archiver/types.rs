//! Types for the archiver.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A directory to pack.
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    /// Directory whose contents go into the archive. Emptied and removed.
    pub source_dir: PathBuf,
    /// Directory the archive is written to.
    pub output_dir: PathBuf,
    /// Archive name without extension.
    pub base_name: String,
}

/// A finished archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveResult {
    /// Absolute path of the archive.
    pub archive_path: PathBuf,
    pub size_bytes: u64,
    /// Whether the emptied source directory could be removed.
    pub source_removed: bool,
    pub duration_ms: u64,
}
