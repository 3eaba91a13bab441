//! Mock archiver for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::archiver::{ArchiveJob, ArchiveResult, Archiver, ArchiverError};

/// A recorded archive job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedArchive {
    pub job: ArchiveJob,
    /// Relative paths of the files found in the source directory.
    pub files: Vec<String>,
    pub success: bool,
}

/// Mock implementation of the Archiver trait.
///
/// Mirrors `zip -r -m`: the "archive" is a plain file listing what was
/// packed, and the source directory is removed afterwards.
#[derive(Debug, Clone)]
pub struct MockArchiver {
    archives: Arc<RwLock<Vec<RecordedArchive>>>,
    next_error: Arc<RwLock<Option<ArchiverError>>>,
    validate_error: Arc<RwLock<Option<ArchiverError>>>,
    hang: Arc<RwLock<bool>>,
}

impl Default for MockArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockArchiver {
    pub fn new() -> Self {
        Self {
            archives: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            validate_error: Arc::new(RwLock::new(None)),
            hang: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded archive jobs.
    pub async fn recorded_archives(&self) -> Vec<RecordedArchive> {
        self.archives.read().await.clone()
    }

    pub async fn archive_count(&self) -> usize {
        self.archives.read().await.len()
    }

    /// Configure the next archive to fail with the given error. The source
    /// directory is left untouched, like a zip that died early.
    pub async fn set_next_error(&self, error: ArchiverError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn set_validate_error(&self, error: ArchiverError) {
        *self.validate_error.write().await = Some(error);
    }

    pub async fn set_hang(&self, hang: bool) {
        *self.hang.write().await = hang;
    }
}

fn list_files(root: &std::path::Path) -> std::io::Result<Vec<String>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if let Ok(relative) = path.strip_prefix(root) {
                files.push(relative.to_string_lossy().into_owned());
            }
        }
    }
    files.sort();
    Ok(files)
}

#[async_trait]
impl Archiver for MockArchiver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn archive(&self, job: ArchiveJob) -> Result<ArchiveResult, ArchiverError> {
        let started = Instant::now();
        let files = list_files(&job.source_dir).unwrap_or_default();

        if *self.hang.read().await {
            std::future::pending::<()>().await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            self.archives.write().await.push(RecordedArchive {
                job,
                files,
                success: false,
            });
            return Err(err);
        }

        let output_dir = std::path::absolute(&job.output_dir)?;
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| ArchiverError::OutputDirectoryFailed {
                path: output_dir.clone(),
                source: e,
            })?;
        let archive_path: PathBuf =
            output_dir.join(format!("{}.{}", job.base_name, self.extension()));
        tokio::fs::write(&archive_path, files.join("\n")).await?;
        let size_bytes = tokio::fs::metadata(&archive_path).await?.len();

        let source_removed = tokio::fs::remove_dir_all(&job.source_dir).await.is_ok();

        self.archives.write().await.push(RecordedArchive {
            job,
            files,
            success: true,
        });

        Ok(ArchiveResult {
            archive_path,
            size_bytes,
            source_removed,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ArchiverError> {
        match self.validate_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_archive_consumes_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        std::fs::create_dir_all(source.join("nested")).unwrap();
        std::fs::write(source.join("a.txt"), "a").unwrap();
        std::fs::write(source.join("nested/b.txt"), "b").unwrap();

        let archiver = MockArchiver::new();
        let result = archiver
            .archive(ArchiveJob {
                source_dir: source.clone(),
                output_dir: temp.path().join("out"),
                base_name: "job".to_string(),
            })
            .await
            .unwrap();

        assert!(result.archive_path.ends_with("out/job.zip"));
        assert!(result.archive_path.is_file());
        assert!(result.source_removed);
        assert!(!source.exists());

        let recorded = archiver.recorded_archives().await;
        assert_eq!(recorded[0].files.len(), 2);
        assert!(recorded[0].files.contains(&"a.txt".to_string()));
    }

    #[tokio::test]
    async fn test_failure_keeps_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        std::fs::create_dir_all(&source).unwrap();

        let archiver = MockArchiver::new();
        archiver
            .set_next_error(ArchiverError::exit_failure(Some(15), b"zip I/O error"))
            .await;

        let result = archiver
            .archive(ArchiveJob {
                source_dir: source.clone(),
                output_dir: temp.path().join("out"),
                base_name: "job".to_string(),
            })
            .await;

        assert!(result.is_err());
        assert!(source.exists());
        assert!(!archiver.recorded_archives().await[0].success);
    }
}
