//! Types for the pipeline orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::archiver::{ArchiveResult, ArchiverError};
use crate::cleanup::CleanupReport;
use crate::downloader::{DownloadResult, DownloaderError};
use crate::magnet::{JobLabel, MagnetError};
use crate::uploader::{UploadResult, UploaderError};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Validating,
    Downloading,
    Archiving,
    Uploading,
    Reporting,
    CleaningUp,
    Done,
    Aborted,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Validating => "validating",
            PipelineState::Downloading => "downloading",
            PipelineState::Archiving => "archiving",
            PipelineState::Uploading => "uploading",
            PipelineState::Reporting => "reporting",
            PipelineState::CleaningUp => "cleaning_up",
            PipelineState::Done => "done",
            PipelineState::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Aborted)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run ended in [`PipelineState::Aborted`].
#[derive(Debug, Error)]
pub enum AbortReason {
    #[error("{0}")]
    InvalidInput(#[from] MagnetError),

    #[error("{0}")]
    DownloadFailed(#[from] DownloaderError),

    #[error("No files were downloaded into {}", .dir.display())]
    EmptyDownload { dir: PathBuf },

    #[error("{0}")]
    ArchiveFailed(#[from] ArchiverError),

    #[error("Interrupted by user while {during}")]
    Interrupted { during: PipelineState },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Notifications emitted while a run progresses.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
    LabelDerived(JobLabel),
    DownloadFinished(DownloadResult),
    ArchiveCreated(ArchiveResult),
}

/// Everything that happened in one run.
#[derive(Debug)]
pub struct PipelineReport {
    /// `Done` or `Aborted`.
    pub final_state: PipelineState,
    /// Every state entered, starting with `Idle`.
    pub transitions: Vec<PipelineState>,
    pub label: Option<JobLabel>,
    pub archive: Option<ArchiveResult>,
    pub upload: Option<UploadResult>,
    /// Set when the upload failed; the run still completes.
    pub upload_error: Option<UploaderError>,
    pub abort_reason: Option<AbortReason>,
    pub cleanup: CleanupReport,
}

impl PipelineReport {
    /// Shareable link, if the upload succeeded.
    pub fn download_page(&self) -> Option<&str> {
        self.upload.as_ref().map(|u| u.download_page.as_str())
    }

    /// Name of the archive that was (or would have been) uploaded.
    pub fn archive_file_name(&self) -> Option<String> {
        self.archive
            .as_ref()
            .and_then(|a| a.archive_path.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }

    /// Whether the run produced a link.
    pub fn is_success(&self) -> bool {
        self.final_state == PipelineState::Done && self.upload.is_some()
    }

    pub fn visited(&self, state: PipelineState) -> bool {
        self.transitions.contains(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_terminal() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Aborted.is_terminal());
        assert!(!PipelineState::CleaningUp.is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&PipelineState::CleaningUp).unwrap();
        assert_eq!(json, "\"cleaning_up\"");
        assert_eq!(PipelineState::CleaningUp.to_string(), "cleaning_up");
    }

    #[test]
    fn test_abort_reason_display() {
        let reason = AbortReason::Interrupted {
            during: PipelineState::Downloading,
        };
        assert_eq!(reason.to_string(), "Interrupted by user while downloading");

        let reason = AbortReason::EmptyDownload {
            dir: PathBuf::from("/content/downloads/x"),
        };
        assert_eq!(
            reason.to_string(),
            "No files were downloaded into /content/downloads/x"
        );
    }
}
