//! Error types for the archiver.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while archiving a download.
#[derive(Debug, Error)]
pub enum ArchiverError {
    /// zip binary not found.
    #[error("zip not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// Source directory does not exist.
    #[error("Source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Archive root could not be created.
    #[error("Failed to create archive directory: {path}")]
    OutputDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// zip exited with a non-zero status.
    #[error("Archiving failed: zip exited with code {code:?}")]
    ExitFailure {
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// zip reported success but produced no file.
    #[error("Archive not created: {path}")]
    MissingOutput { path: PathBuf },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiverError {
    /// Creates an exit failure, keeping stderr when there was any.
    pub fn exit_failure(code: Option<i32>, stderr: &[u8]) -> Self {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        Self::ExitFailure {
            code,
            stderr: if stderr.is_empty() { None } else { Some(stderr) },
        }
    }
}
