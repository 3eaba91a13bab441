//! Error types for the uploader.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while uploading.
#[derive(Debug, Error)]
pub enum UploaderError {
    /// File to upload does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The endpoint is not a usable URL.
    #[error("Invalid upload endpoint: {0}")]
    InvalidEndpoint(String),

    /// Request could not be sent or the response not received.
    #[error("Upload request failed: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Upload timed out")]
    Timeout,

    /// Host answered with something other than 200.
    #[error("Upload failed with status code: {status}")]
    HttpStatus { status: u16 },

    /// Host answered 200 but reported a failure.
    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: String, message: String },

    /// Response body was not what the host documents.
    #[error("Unexpected upload response: {0}")]
    MalformedResponse(String),

    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for UploaderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UploaderError::Timeout
        } else {
            UploaderError::Transport(e.to_string())
        }
    }
}
