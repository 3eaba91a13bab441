//! Archiver: packs a finished download into one zip, moving files as it goes.

mod config;
mod error;
mod traits;
mod types;
mod zip;

pub use config::ArchiverConfig;
pub use error::ArchiverError;
pub use traits::Archiver;
pub use types::{ArchiveJob, ArchiveResult};
pub use zip::ZipArchiver;
