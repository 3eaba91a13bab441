pub mod archiver;
pub mod cleanup;
pub mod config;
pub mod downloader;
pub mod magnet;
pub mod pipeline;
pub mod testing;
pub mod uploader;

pub use archiver::{ArchiveJob, ArchiveResult, Archiver, ArchiverConfig, ArchiverError, ZipArchiver};
pub use cleanup::{CleanupReport, CleanupWarning};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, PathsConfig,
};
pub use downloader::{
    Aria2Downloader, DownloadProgress, DownloadRequest, DownloadResult, Downloader,
    DownloaderConfig, DownloaderError,
};
pub use magnet::{JobLabel, MagnetError, MagnetLink};
pub use pipeline::{
    AbortReason, EventCallback, Pipeline, PipelineEvent, PipelineReport, PipelineState,
    PreflightError,
};
pub use uploader::{GofileUploader, UploadResult, Uploader, UploaderConfig, UploaderError};
