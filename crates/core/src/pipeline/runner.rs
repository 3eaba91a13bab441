//! Pipeline runner.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::archiver::{ArchiveJob, Archiver, ArchiverError};
use crate::cleanup::{cleanup, is_empty_dir, CleanupReport};
use crate::config::PathsConfig;
use crate::downloader::{DownloadProgress, DownloadRequest, Downloader, DownloaderError};
use crate::magnet::{JobLabel, MagnetLink};
use crate::uploader::{Uploader, UploaderError};

use super::types::{AbortReason, PipelineEvent, PipelineReport, PipelineState};

/// Callback invoked for every [`PipelineEvent`].
pub type EventCallback = Arc<dyn Fn(&PipelineEvent) + Send + Sync>;

/// A tool the pipeline needs is missing or misconfigured.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("downloader not ready: {0}")]
    Downloader(#[from] DownloaderError),

    #[error("archiver not ready: {0}")]
    Archiver(#[from] ArchiverError),

    #[error("uploader not ready: {0}")]
    Uploader(#[from] UploaderError),
}

/// How a guarded stage ended.
enum Stage<T> {
    Finished(T),
    Interrupted,
    Panicked(String),
}

/// State bookkeeping for one run.
struct Tracker {
    state: PipelineState,
    transitions: Vec<PipelineState>,
    on_event: Option<EventCallback>,
}

impl Tracker {
    fn new(on_event: Option<EventCallback>) -> Self {
        Self {
            state: PipelineState::Idle,
            transitions: vec![PipelineState::Idle],
            on_event,
        }
    }

    fn transition(&mut self, to: PipelineState) {
        let from = self.state;
        debug!(%from, %to, "Pipeline state change");
        self.state = to;
        self.transitions.push(to);
        self.emit(PipelineEvent::StateChanged { from, to });
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(ref callback) = self.on_event {
            callback(&event);
        }
    }
}

/// Runs one magnet link through download, archive, upload and cleanup.
pub struct Pipeline<D: Downloader, A: Archiver, U: Uploader> {
    paths: PathsConfig,
    downloader: D,
    archiver: A,
    uploader: U,
    progress_tx: Option<mpsc::Sender<DownloadProgress>>,
    on_event: Option<EventCallback>,
}

impl<D: Downloader, A: Archiver, U: Uploader> Pipeline<D, A, U> {
    pub fn new(paths: PathsConfig, downloader: D, archiver: A, uploader: U) -> Self {
        Self {
            paths,
            downloader,
            archiver,
            uploader,
            progress_tx: None,
            on_event: None,
        }
    }

    /// Forwards filtered download progress to `tx`.
    pub fn with_progress(mut self, tx: mpsc::Sender<DownloadProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Sets the callback for state changes and stage results.
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    /// Checks that every external tool is usable before asking for input.
    pub async fn preflight(&self) -> Result<(), PreflightError> {
        self.downloader.validate().await?;
        self.archiver.validate().await?;
        self.uploader.validate().await?;
        Ok(())
    }

    /// Runs the pipeline with no way to interrupt it.
    pub async fn run(&self, input: &str) -> PipelineReport {
        self.run_until(input, std::future::pending()).await
    }

    /// Runs the pipeline; when `interrupt` completes the active stage is
    /// dropped (killing any child process) and the run aborts.
    pub async fn run_until<F>(&self, input: &str, interrupt: F) -> PipelineReport
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        let mut tracker = Tracker::new(self.on_event.clone());

        tracker.transition(PipelineState::Validating);
        let magnet = match MagnetLink::parse(input) {
            Ok(magnet) => magnet,
            Err(e) => {
                // Nothing was written yet, so there is nothing to clean up
                warn!("Rejected input: not a magnet link");
                tracker.transition(PipelineState::Aborted);
                return aborted(
                    tracker,
                    AbortReason::InvalidInput(e),
                    None,
                    CleanupReport::default(),
                );
            }
        };

        let label = JobLabel::from_magnet(&magnet);
        info!(label = %label, "Job label derived");
        tracker.emit(PipelineEvent::LabelDerived(label.clone()));

        let job_dir = self.paths.download_root.join(label.as_str());
        let archive_path = self.expected_archive_path(&label);
        let leftovers = [archive_path.clone(), job_dir.clone()];

        // Download
        tracker.transition(PipelineState::Downloading);
        let request = DownloadRequest::new(magnet, &job_dir);
        let download = self.downloader.download(request, self.progress_tx.clone());
        match guard(download, interrupt.as_mut()).await {
            Stage::Finished(Ok(result)) => tracker.emit(PipelineEvent::DownloadFinished(result)),
            Stage::Finished(Err(e)) => {
                error!(error = %e, "Download failed");
                return self
                    .abort(tracker, AbortReason::DownloadFailed(e), Some(label), &leftovers)
                    .await;
            }
            other => {
                let reason = interrupted_or_panicked(other, PipelineState::Downloading);
                return self.abort(tracker, reason, Some(label), &leftovers).await;
            }
        }

        match is_empty_dir(&job_dir).await {
            Ok(false) => {}
            Ok(true) => {
                return self
                    .abort(
                        tracker,
                        AbortReason::EmptyDownload { dir: job_dir.clone() },
                        Some(label),
                        &leftovers,
                    )
                    .await;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return self
                    .abort(
                        tracker,
                        AbortReason::EmptyDownload { dir: job_dir.clone() },
                        Some(label),
                        &leftovers,
                    )
                    .await;
            }
            Err(e) => {
                return self
                    .abort(
                        tracker,
                        AbortReason::Unexpected(format!(
                            "cannot read {}: {}",
                            job_dir.display(),
                            e
                        )),
                        Some(label),
                        &leftovers,
                    )
                    .await;
            }
        }

        // Archive
        tracker.transition(PipelineState::Archiving);
        let job = ArchiveJob {
            source_dir: job_dir.clone(),
            output_dir: self.paths.archive_root.clone(),
            base_name: label.as_str().to_string(),
        };
        let archive = match guard(self.archiver.archive(job), interrupt.as_mut()).await {
            Stage::Finished(Ok(archive)) => {
                tracker.emit(PipelineEvent::ArchiveCreated(archive.clone()));
                archive
            }
            Stage::Finished(Err(e)) => {
                error!(error = %e, "Archiving failed");
                return self
                    .abort(tracker, AbortReason::ArchiveFailed(e), Some(label), &leftovers)
                    .await;
            }
            other => {
                let reason = interrupted_or_panicked(other, PipelineState::Archiving);
                return self.abort(tracker, reason, Some(label), &leftovers).await;
            }
        };

        // Upload; failure is reported, not fatal
        tracker.transition(PipelineState::Uploading);
        let stage = guard(self.uploader.upload(&archive.archive_path), interrupt.as_mut()).await;
        let (upload, upload_error) = match stage {
            Stage::Finished(Ok(upload)) => (Some(upload), None),
            Stage::Finished(Err(e)) => {
                warn!(error = %e, "Upload failed, continuing to cleanup");
                (None, Some(e))
            }
            other => {
                let reason = interrupted_or_panicked(other, PipelineState::Uploading);
                let leftovers = [archive.archive_path.clone(), job_dir];
                let mut report = self.abort(tracker, reason, Some(label), &leftovers).await;
                report.archive = Some(archive);
                return report;
            }
        };

        tracker.transition(PipelineState::Reporting);

        tracker.transition(PipelineState::CleaningUp);
        let cleanup_report = self
            .cleanup(&[archive.archive_path.clone(), job_dir])
            .await;

        tracker.transition(PipelineState::Done);
        info!(
            label = %label,
            link = upload.as_ref().map(|u| u.download_page.as_str()).unwrap_or("-"),
            "Pipeline finished"
        );

        PipelineReport {
            final_state: tracker.state,
            transitions: tracker.transitions,
            label: Some(label),
            archive: Some(archive),
            upload,
            upload_error,
            abort_reason: None,
            cleanup: cleanup_report,
        }
    }

    /// Where the archiver is expected to put the archive for `label`.
    fn expected_archive_path(&self, label: &JobLabel) -> PathBuf {
        let root = std::path::absolute(&self.paths.archive_root)
            .unwrap_or_else(|_| self.paths.archive_root.clone());
        root.join(format!("{}.{}", label, self.archiver.extension()))
    }

    async fn cleanup(&self, paths: &[PathBuf]) -> CleanupReport {
        let report = cleanup(paths, &self.paths.download_root).await;
        if !report.is_clean() {
            warn!(warnings = report.warnings.len(), "Cleanup finished with warnings");
        }
        report
    }

    async fn abort(
        &self,
        mut tracker: Tracker,
        reason: AbortReason,
        label: Option<JobLabel>,
        leftovers: &[PathBuf],
    ) -> PipelineReport {
        info!(reason = %reason, during = %tracker.state, "Pipeline aborted");
        tracker.transition(PipelineState::Aborted);
        let cleanup_report = self.cleanup(leftovers).await;
        aborted(tracker, reason, label, cleanup_report)
    }

    /// Download root this pipeline works under.
    pub fn download_root(&self) -> &Path {
        &self.paths.download_root
    }
}

fn aborted(
    tracker: Tracker,
    reason: AbortReason,
    label: Option<JobLabel>,
    cleanup: CleanupReport,
) -> PipelineReport {
    PipelineReport {
        final_state: tracker.state,
        transitions: tracker.transitions,
        label,
        archive: None,
        upload: None,
        upload_error: None,
        abort_reason: Some(reason),
        cleanup,
    }
}

/// Runs a stage, racing it against the interrupt and catching panics.
async fn guard<T, Fut, I>(stage: Fut, interrupt: Pin<&mut I>) -> Stage<T>
where
    Fut: Future<Output = T>,
    I: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = interrupt => Stage::Interrupted,
        result = AssertUnwindSafe(stage).catch_unwind() => match result {
            Ok(value) => Stage::Finished(value),
            Err(payload) => Stage::Panicked(panic_message(payload)),
        },
    }
}

fn interrupted_or_panicked<T>(stage: Stage<T>, during: PipelineState) -> AbortReason {
    match stage {
        Stage::Interrupted => {
            warn!(%during, "Interrupted by user");
            AbortReason::Interrupted { during }
        }
        Stage::Panicked(message) => {
            error!(%during, %message, "Stage panicked");
            AbortReason::Unexpected(message)
        }
        Stage::Finished(_) => AbortReason::Unexpected(format!("{} finished unexpectedly", during)),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "stage panicked".to_string()
    }
}
