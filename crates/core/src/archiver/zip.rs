//! Archiver backed by the Info-ZIP `zip` command.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::config::ArchiverConfig;
use super::error::ArchiverError;
use super::traits::Archiver;
use super::types::{ArchiveJob, ArchiveResult};

/// Runs `zip -r -m` inside the source directory.
///
/// `-m` deletes each file once it is stored, so peak disk usage stays close to
/// the size of the download instead of doubling.
pub struct ZipArchiver {
    config: ArchiverConfig,
}

impl ZipArchiver {
    pub fn new(config: ArchiverConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ArchiverConfig::default())
    }

    /// Absolute archive path for a job.
    ///
    /// zip runs with the source as its working directory, so a relative
    /// output path would land inside the source.
    fn archive_path(&self, job: &ArchiveJob) -> Result<PathBuf, ArchiverError> {
        let output_dir = std::path::absolute(&job.output_dir)?;
        Ok(output_dir.join(format!("{}.{}", job.base_name, self.extension())))
    }

    fn build_args(&self, archive_path: &Path) -> Vec<String> {
        let mut args = vec!["-r".to_string(), "-m".to_string()];

        if let Some(level) = self.config.compression_level {
            args.push(format!("-{}", level.min(9)));
        }

        args.push(archive_path.to_string_lossy().to_string());
        args.push(".".to_string());
        args
    }
}

#[async_trait]
impl Archiver for ZipArchiver {
    fn name(&self) -> &str {
        "zip"
    }

    async fn archive(&self, job: ArchiveJob) -> Result<ArchiveResult, ArchiverError> {
        let start = Instant::now();

        match tokio::fs::metadata(&job.source_dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(ArchiverError::SourceNotFound {
                    path: job.source_dir.clone(),
                })
            }
        }

        tokio::fs::create_dir_all(&job.output_dir)
            .await
            .map_err(|e| ArchiverError::OutputDirectoryFailed {
                path: job.output_dir.clone(),
                source: e,
            })?;

        let archive_path = self.archive_path(&job)?;

        // zip appends to an existing archive; start from scratch
        match tokio::fs::remove_file(&archive_path).await {
            Ok(()) => debug!(path = %archive_path.display(), "Removed stale archive"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ArchiverError::Io(e)),
        }

        info!(
            source = %job.source_dir.display(),
            archive = %archive_path.display(),
            "Creating archive"
        );

        let output = Command::new(&self.config.zip_path)
            .args(self.build_args(&archive_path))
            .current_dir(&job.source_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ArchiverError::BinaryNotFound {
                        path: self.config.zip_path.clone(),
                    }
                } else {
                    ArchiverError::Io(e)
                }
            })?;

        if !output.status.success() {
            warn!(code = ?output.status.code(), "zip exited unsuccessfully");
            return Err(ArchiverError::exit_failure(
                output.status.code(),
                &output.stderr,
            ));
        }

        let size_bytes = tokio::fs::metadata(&archive_path)
            .await
            .map_err(|_| ArchiverError::MissingOutput {
                path: archive_path.clone(),
            })?
            .len();

        // Best effort: anything zip could not move stays behind for cleanup
        let source_removed = match tokio::fs::remove_dir(&job.source_dir).await {
            Ok(()) => {
                debug!(path = %job.source_dir.display(), "Removed emptied source directory");
                true
            }
            Err(e) => {
                debug!(
                    path = %job.source_dir.display(),
                    error = %e,
                    "Source directory not removed"
                );
                false
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(size_bytes, duration_ms, "Archive created");

        Ok(ArchiveResult {
            archive_path,
            size_bytes,
            source_removed,
            duration_ms,
        })
    }

    async fn validate(&self) -> Result<(), ArchiverError> {
        let result = Command::new(&self.config.zip_path)
            .arg("-v")
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ArchiverError::BinaryNotFound {
                    path: self.config.zip_path.clone(),
                })
            }
            Err(e) => Err(ArchiverError::Io(e)),
        }
    }
}
