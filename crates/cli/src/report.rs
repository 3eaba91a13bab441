//! Human-readable messages for pipeline events and the final summary.

use magnetdrop_core::{AbortReason, PipelineEvent, PipelineReport, PipelineState};

/// Hint printed when a required tool is missing.
pub const INSTALL_HINT: &str =
    "magnetdrop needs aria2c and zip on PATH (Debian/Ubuntu: apt-get install -y aria2 zip)";

/// One-line message for an event, if it deserves one.
pub fn describe_event(event: &PipelineEvent) -> Option<String> {
    match event {
        PipelineEvent::LabelDerived(label) => Some(format!("Job: {}", label)),
        PipelineEvent::StateChanged { to, .. } => match to {
            PipelineState::Downloading => Some("Downloading...".to_string()),
            PipelineState::Archiving => Some("Archiving...".to_string()),
            PipelineState::Uploading => Some("Uploading...".to_string()),
            PipelineState::CleaningUp => Some("Cleaning up...".to_string()),
            _ => None,
        },
        PipelineEvent::DownloadFinished(result) => Some(format!(
            "Download finished in {}",
            format_duration(result.duration_ms)
        )),
        PipelineEvent::ArchiveCreated(archive) => Some(format!(
            "Archive ready: {} ({})",
            archive
                .archive_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format_size(archive.size_bytes)
        )),
    }
}

/// Final summary printed after the run.
pub fn summary(report: &PipelineReport) -> String {
    let mut lines = Vec::new();

    if let Some(ref label) = report.label {
        lines.push(format!("Label:   {}", label));
    }
    if let Some(name) = report.archive_file_name() {
        lines.push(format!("Archive: {}", name));
    }

    match (report.download_page(), &report.upload_error, &report.abort_reason) {
        (Some(link), _, _) => lines.push(format!("Link:    {}", link)),
        (None, Some(e), _) => lines.push(format!("Upload failed: {}", e)),
        (None, None, Some(reason)) => lines.push(abort_message(reason)),
        (None, None, None) => lines.push("No link was produced".to_string()),
    }

    for warning in &report.cleanup.warnings {
        lines.push(format!(
            "Cleanup warning: {}: {}",
            warning.path.display(),
            warning.message
        ));
    }

    lines.join("\n")
}

fn abort_message(reason: &AbortReason) -> String {
    match reason {
        AbortReason::InvalidInput(_) => {
            "Invalid magnet link: input must start with \"magnet:\"".to_string()
        }
        AbortReason::Interrupted { .. } => format!("{}; partial data removed", reason),
        other => format!("Aborted: {}", other),
    }
}

/// Process exit code for a finished run.
pub fn exit_code(report: &PipelineReport) -> i32 {
    if report.is_success() {
        0
    } else {
        1
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}.{}s", secs, (ms % 1000) / 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magnetdrop_core::{
        ArchiveResult, CleanupReport, CleanupWarning, JobLabel, MagnetLink, UploadResult,
        UploaderError,
    };
    use std::path::PathBuf;

    fn label() -> JobLabel {
        let magnet = MagnetLink::parse("magnet:?xt=urn:btih:abc&dn=My+Cool+File").unwrap();
        JobLabel::from_magnet(&magnet)
    }

    fn report(final_state: PipelineState) -> PipelineReport {
        PipelineReport {
            final_state,
            transitions: vec![PipelineState::Idle, final_state],
            label: Some(label()),
            archive: Some(ArchiveResult {
                archive_path: PathBuf::from("/tmp/magnetdrop/My_Cool_File.zip"),
                size_bytes: 2048,
                source_removed: true,
                duration_ms: 10,
            }),
            upload: None,
            upload_error: None,
            abort_reason: None,
            cleanup: CleanupReport::default(),
        }
    }

    #[test]
    fn test_summary_with_link() {
        let mut report = report(PipelineState::Done);
        report.upload = Some(UploadResult {
            download_page: "https://gofile.io/d/Xy12Ab".to_string(),
            file_id: None,
            file_name: "My_Cool_File.zip".to_string(),
            size_bytes: 2048,
            duration_ms: 5,
        });

        let text = summary(&report);

        assert!(text.contains("Label:   My_Cool_File"));
        assert!(text.contains("Archive: My_Cool_File.zip"));
        assert!(text.contains("Link:    https://gofile.io/d/Xy12Ab"));
        assert_eq!(exit_code(&report), 0);
    }

    #[test]
    fn test_summary_upload_failure() {
        let mut report = report(PipelineState::Done);
        report.upload_error = Some(UploaderError::HttpStatus { status: 502 });

        let text = summary(&report);

        assert!(text.contains("Upload failed: Upload failed with status code: 502"));
        assert_eq!(exit_code(&report), 1);
    }

    #[test]
    fn test_summary_invalid_input() {
        let mut report = report(PipelineState::Aborted);
        report.label = None;
        report.archive = None;
        report.abort_reason = Some(AbortReason::InvalidInput(
            MagnetLink::parse("not-a-magnet").unwrap_err(),
        ));

        let text = summary(&report);

        assert!(text.starts_with("Invalid magnet link"));
        assert_eq!(exit_code(&report), 1);
    }

    #[test]
    fn test_summary_lists_cleanup_warnings() {
        let mut report = report(PipelineState::Aborted);
        report.archive = None;
        report.abort_reason = Some(AbortReason::Interrupted {
            during: PipelineState::Downloading,
        });
        report.cleanup.warnings.push(CleanupWarning {
            path: PathBuf::from("/tmp/magnetdrop/downloads/My_Cool_File"),
            message: "Permission denied".to_string(),
        });

        let text = summary(&report);

        assert!(text.contains("Interrupted by user while downloading"));
        assert!(text.contains("Cleanup warning: /tmp/magnetdrop/downloads/My_Cool_File"));
    }

    #[test]
    fn test_describe_event() {
        let event = PipelineEvent::StateChanged {
            from: PipelineState::Downloading,
            to: PipelineState::Archiving,
        };
        assert_eq!(describe_event(&event).as_deref(), Some("Archiving..."));

        let event = PipelineEvent::StateChanged {
            from: PipelineState::Reporting,
            to: PipelineState::Done,
        };
        assert_eq!(describe_event(&event), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(125_000), "2m05s");
    }
}
