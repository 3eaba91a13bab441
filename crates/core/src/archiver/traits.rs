//! Trait definitions for the archiver.

use async_trait::async_trait;

use super::error::ArchiverError;
use super::types::{ArchiveJob, ArchiveResult};

/// Packs a directory into a single file.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Returns the name of this archiver implementation.
    fn name(&self) -> &str;

    /// File extension of produced archives, without the dot.
    fn extension(&self) -> &str {
        "zip"
    }

    /// Archives the job's source directory, consuming its contents.
    async fn archive(&self, job: ArchiveJob) -> Result<ArchiveResult, ArchiverError>;

    /// Validates that the archiver is installed and ready.
    async fn validate(&self) -> Result<(), ArchiverError>;
}
