//! Mock stage implementations for pipeline tests.
//!
//! The mocks work on the real filesystem so cleanup behavior can be asserted,
//! but never spawn processes or touch the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use magnetdrop_core::testing::{MockArchiver, MockDownloader, MockUploader};
//!
//! let downloader = MockDownloader::new();
//! downloader.set_files(vec![("movie.mkv".into(), b"data".to_vec())]).await;
//!
//! let uploader = MockUploader::new();
//! uploader.set_next_error(UploaderError::HttpStatus { status: 500 }).await;
//! ```

mod mock_archiver;
mod mock_downloader;
mod mock_uploader;

pub use mock_archiver::{MockArchiver, RecordedArchive};
pub use mock_downloader::MockDownloader;
pub use mock_uploader::{MockUploader, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::config::PathsConfig;
    use std::path::Path;

    /// Magnet link used across tests; the display name decodes to `My Cool File`.
    pub const COOL_FILE_MAGNET: &str =
        "magnet:?xt=urn:btih:c9e15763f722f23e98a29decdfae341b98d53056&dn=My+Cool+File";

    /// Magnet link with only an info hash.
    pub fn bare_magnet(info_hash: &str) -> String {
        format!("magnet:?xt=urn:btih:{}", info_hash)
    }

    /// Paths rooted under `base`, so tests never touch the shared temp dirs.
    pub fn paths_under(base: &Path) -> PathsConfig {
        PathsConfig::under(base)
    }
}
