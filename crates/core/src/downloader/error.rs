//! Error types for the download runner.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running the download engine.
#[derive(Debug, Error)]
pub enum DownloaderError {
    /// aria2c binary not found.
    #[error("aria2c not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// Target directory could not be created.
    #[error("Failed to create download directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine exited with a non-zero status.
    #[error("Download failed: {reason}")]
    ExitFailure {
        code: Option<i32>,
        reason: String,
        output: Option<String>,
    },

    /// The configured timeout elapsed.
    #[error("Download timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while talking to the child process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloaderError {
    /// Creates an exit failure, describing the code when aria2 documents it.
    pub fn exit_failure(code: Option<i32>, output: Option<String>) -> Self {
        let reason = match code {
            Some(c) => match exit_code_meaning(c) {
                Some(meaning) => format!("aria2c exited with code {} ({})", c, meaning),
                None => format!("aria2c exited with code {}", c),
            },
            None => "aria2c was terminated by a signal".to_string(),
        };
        Self::ExitFailure {
            code,
            reason,
            output,
        }
    }

    /// Exit code of the engine, when it exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ExitFailure { code, .. } => *code,
            _ => None,
        }
    }
}

/// Meaning of aria2's documented exit statuses.
///
/// Every non-zero status is handled the same way; this is only for messages.
fn exit_code_meaning(code: i32) -> Option<&'static str> {
    let meaning = match code {
        1 => "unknown error",
        2 => "timed out",
        3 => "resource not found",
        5 => "download speed too slow",
        6 => "network problem",
        7 => "unfinished downloads",
        9 => "not enough disk space",
        13 => "file already exists",
        16 => "could not create or truncate file",
        17 => "file I/O error",
        18 => "could not create directory",
        19 => "name resolution failed",
        26 => "corrupted torrent metadata",
        27 => "bad magnet URI",
        28 => "bad or unrecognized option",
        _ => return None,
    };
    Some(meaning)
}
