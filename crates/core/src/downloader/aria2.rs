//! aria2c-based download runner.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::DownloaderConfig;
use super::error::DownloaderError;
use super::progress::ProgressFilter;
use super::traits::Downloader;
use super::types::{DownloadProgress, DownloadRequest, DownloadResult};

/// Error lines kept for the failure report.
const MAX_ERROR_LINES: usize = 20;

/// Runs `aria2c` as a child process.
pub struct Aria2Downloader {
    config: DownloaderConfig,
}

impl Aria2Downloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(DownloaderConfig::default())
    }

    /// Builds the aria2c command line for a request.
    fn build_args(&self, request: &DownloadRequest) -> Vec<String> {
        let mut args = vec![
            format!("--seed-time={}", self.config.seed_time_secs),
            format!("--max-upload-limit={}", self.config.max_upload_limit),
            format!("--dir={}", request.target_dir.to_string_lossy()),
            format!("--summary-interval={}", self.config.summary_interval_secs),
            "--download-result=hide".to_string(),
            format!("--console-log-level={}", self.config.console_log_level),
        ];

        args.extend(self.config.extra_args.iter().cloned());

        // Magnet last, as a positional argument
        args.push(request.magnet.as_str().to_string());

        args
    }

    fn spawn(&self, args: &[String]) -> Result<Child, DownloaderError> {
        Command::new(&self.config.aria2c_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DownloaderError::BinaryNotFound {
                        path: self.config.aria2c_path.clone(),
                    }
                } else {
                    DownloaderError::Io(e)
                }
            })
    }

    /// Reads both output pipes until they close, then waits for the exit.
    async fn follow(
        mut child: Child,
        progress_tx: Option<mpsc::Sender<DownloadProgress>>,
    ) -> Result<(std::process::ExitStatus, usize, String), DownloaderError> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("aria2c stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("aria2c stderr not captured"))?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stdout_open = true;
        let mut stderr_open = true;

        let mut filter = ProgressFilter::new();
        let mut updates = 0usize;
        let mut error_output = String::new();
        let mut error_lines = 0usize;

        while stdout_open || stderr_open {
            let line = tokio::select! {
                line = stdout_lines.next_line(), if stdout_open => {
                    let line = line?;
                    stdout_open = line.is_some();
                    line
                }
                line = stderr_lines.next_line(), if stderr_open => {
                    let line = line?;
                    stderr_open = line.is_some();
                    line
                }
            };

            let Some(line) = line else { continue };

            if error_lines < MAX_ERROR_LINES && line.to_lowercase().contains("error") {
                error_output.push_str(line.trim());
                error_output.push('\n');
                error_lines += 1;
            }

            if let Some(progress) = filter.accept(&line) {
                updates += 1;
                if let Some(ref tx) = progress_tx {
                    // Non-blocking send
                    let _ = tx.try_send(progress);
                }
            } else {
                debug!(line = %line.trim(), "aria2c");
            }
        }

        let status = child.wait().await?;
        Ok((status, updates, error_output))
    }
}

#[async_trait]
impl Downloader for Aria2Downloader {
    fn name(&self) -> &str {
        "aria2c"
    }

    async fn download(
        &self,
        request: DownloadRequest,
        progress_tx: Option<mpsc::Sender<DownloadProgress>>,
    ) -> Result<DownloadResult, DownloaderError> {
        let start = Instant::now();

        tokio::fs::create_dir_all(&request.target_dir)
            .await
            .map_err(|e| DownloaderError::DirectoryCreationFailed {
                path: request.target_dir.clone(),
                source: e,
            })?;

        let args = self.build_args(&request);
        info!(
            target_dir = %request.target_dir.display(),
            "Starting aria2c download"
        );
        let child = self.spawn(&args)?;

        let (status, progress_updates, error_output) = match self.config.timeout_secs {
            Some(timeout_secs) => {
                // Dropping the future on timeout kills the child (kill_on_drop)
                timeout(
                    Duration::from_secs(timeout_secs),
                    Self::follow(child, progress_tx),
                )
                .await
                .map_err(|_| DownloaderError::Timeout { timeout_secs })??
            }
            None => Self::follow(child, progress_tx).await?,
        };

        if !status.success() {
            warn!(code = ?status.code(), "aria2c exited unsuccessfully");
            return Err(DownloaderError::exit_failure(
                status.code(),
                if error_output.is_empty() {
                    None
                } else {
                    Some(error_output)
                },
            ));
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(duration_ms, progress_updates, "aria2c download finished");

        Ok(DownloadResult {
            target_dir: request.target_dir,
            duration_ms,
            progress_updates,
        })
    }

    async fn validate(&self) -> Result<(), DownloaderError> {
        let result = Command::new(&self.config.aria2c_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DownloaderError::BinaryNotFound {
                    path: self.config.aria2c_path.clone(),
                })
            }
            Err(e) => Err(DownloaderError::Io(e)),
        }
    }
}
