//! Download runner.
//!
//! The torrent transfer is delegated to an external engine (`aria2c`). This
//! module builds its command line, follows its output for progress, and turns
//! its exit status into a result.
//!
//! # Example
//!
//! ```ignore
//! use magnetdrop_core::downloader::{Aria2Downloader, DownloadRequest, Downloader};
//!
//! let downloader = Aria2Downloader::with_defaults();
//! downloader.validate().await?;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(16);
//! let request = DownloadRequest::new(magnet, "/content/downloads/My_Cool_File");
//! let result = downloader.download(request, Some(tx)).await?;
//! ```

mod aria2;
mod config;
mod error;
mod progress;
mod traits;
mod types;

pub use aria2::Aria2Downloader;
pub use config::DownloaderConfig;
pub use error::DownloaderError;
pub use progress::{ProgressFilter, MAX_STATUS_LEN};
pub use traits::Downloader;
pub use types::{DownloadProgress, DownloadRequest, DownloadResult};
