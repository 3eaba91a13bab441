//! Uploader: sends the archive to a public file host and returns its link.

mod config;
mod error;
mod gofile;
mod traits;
mod types;

pub use config::UploaderConfig;
pub use error::UploaderError;
pub use gofile::GofileUploader;
pub use traits::Uploader;
pub use types::UploadResult;
