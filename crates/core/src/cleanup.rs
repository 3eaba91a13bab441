//! Removal of everything a run left on disk.
//!
//! Cleanup never fails: problems are returned as warnings so the caller can
//! report them, and one failed deletion does not stop the others.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A path that could not be removed.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub message: String,
}

/// What a cleanup pass did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// Paths that existed and were deleted, in order.
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<CleanupWarning>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, path: &Path, error: &io::Error) {
        warn!(path = %path.display(), error = %error, "Could not delete");
        self.warnings.push(CleanupWarning {
            path: path.to_path_buf(),
            message: error.to_string(),
        });
    }
}

/// Deletes each existing path (directories recursively), then removes
/// `downloads_root` if it is left empty.
pub async fn cleanup(paths: &[PathBuf], downloads_root: &Path) -> CleanupReport {
    let mut report = CleanupReport::default();

    for path in paths {
        // Symlinks are removed, never followed
        let meta = match tokio::fs::symlink_metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                report.warn(path, &e);
                continue;
            }
        };

        let result = if meta.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };

        match result {
            Ok(()) => {
                info!(path = %path.display(), "Deleted");
                report.removed.push(path.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => report.warn(path, &e),
        }
    }

    match is_empty_dir(downloads_root).await {
        Ok(true) => match tokio::fs::remove_dir(downloads_root).await {
            Ok(()) => {
                info!(path = %downloads_root.display(), "Removed empty downloads directory");
                report.removed.push(downloads_root.to_path_buf());
            }
            Err(e) => report.warn(downloads_root, &e),
        },
        Ok(false) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => debug!(
            path = %downloads_root.display(),
            error = %e,
            "Downloads directory not inspected"
        ),
    }

    report
}

/// Whether `dir` exists and has no entries.
pub async fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    Ok(entries.next_entry().await?.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_removes_files_and_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("downloads");
        let job_dir = root.join("job");
        std::fs::create_dir_all(job_dir.join("nested")).unwrap();
        std::fs::write(job_dir.join("nested").join("a.bin"), b"a").unwrap();
        let archive = temp.path().join("job.zip");
        std::fs::write(&archive, b"zip").unwrap();

        let report = cleanup(&[archive.clone(), job_dir.clone()], &root).await;

        assert!(report.is_clean());
        assert!(!archive.exists());
        assert!(!job_dir.exists());
        assert!(!root.exists());
        assert_eq!(report.removed, vec![archive, job_dir, root]);
    }

    #[tokio::test]
    async fn test_missing_paths_are_skipped() {
        let temp = TempDir::new().unwrap();
        let report = cleanup(
            &[temp.path().join("nope.zip"), temp.path().join("nope")],
            &temp.path().join("downloads"),
        )
        .await;

        assert!(report.is_clean());
        assert!(report.removed.is_empty());
    }

    #[tokio::test]
    async fn test_non_empty_root_is_kept() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("downloads");
        std::fs::create_dir_all(root.join("other-job")).unwrap();

        let report = cleanup(&[root.join("job")], &root).await;

        assert!(report.is_clean());
        assert!(root.join("other-job").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_removed_not_followed() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("keep");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("precious"), b"x").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let report = cleanup(&[link.clone()], &temp.path().join("downloads")).await;

        assert!(report.is_clean());
        assert!(!link.exists());
        assert!(target.join("precious").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_is_a_warning_and_cleanup_continues() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        std::fs::create_dir_all(&locked).unwrap();
        let stuck = locked.join("stuck.zip");
        std::fs::write(&stuck, b"zip").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();
        let other = temp.path().join("other.zip");
        std::fs::write(&other, b"zip").unwrap();

        let report = cleanup(&[stuck.clone(), other.clone()], &temp.path().join("downloads")).await;

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(!other.exists());
        // Root ignores directory permissions
        if stuck.exists() {
            assert_eq!(report.warnings.len(), 1);
            assert_eq!(report.warnings[0].path, stuck);
        }
    }

    #[tokio::test]
    async fn test_is_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(is_empty_dir(temp.path()).await.unwrap());
        std::fs::write(temp.path().join("f"), b"").unwrap();
        assert!(!is_empty_dir(temp.path()).await.unwrap());
        assert!(is_empty_dir(&temp.path().join("missing")).await.is_err());
    }
}
