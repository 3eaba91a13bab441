//! Filtering of the engine's console output down to progress lines.

use regex_lite::Regex;

use super::types::DownloadProgress;

/// Longest status line handed to the renderer, in characters.
pub const MAX_STATUS_LEN: usize = 100;

/// Substrings (lowercase) that mark log noise rather than progress.
const NOISE_MARKERS: &[&str] = &[
    "---",
    "download result",
    "gid:",
    "status:active",
    "uri:",
    "local:",
    "remote:",
    "[metadata]",
];

/// Substrings that mark a progress summary.
const PROGRESS_INDICATORS: &[&str] = &["DL:", "CN:", "%", "ETA:", "SIZE:", "SEED"];

/// Stateful filter over the engine's output lines.
///
/// Keeps only progress summaries and drops a line identical to the last one
/// accepted, so the renderer only redraws when something changed.
pub struct ProgressFilter {
    last_line: Option<String>,
    size_regex: Option<Regex>,
    connections_regex: Option<Regex>,
    rate_regex: Option<Regex>,
    eta_regex: Option<Regex>,
}

impl Default for ProgressFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressFilter {
    pub fn new() -> Self {
        Self {
            last_line: None,
            size_regex: Regex::new(r"([\d.]+[KMGTP]?i?B)/([\d.]+[KMGTP]?i?B)(?:\((\d{1,3})%\))?").ok(),
            connections_regex: Regex::new(r"CN:(\d+)").ok(),
            rate_regex: Regex::new(r"DL:([\d.]+[KMGTP]?i?B)").ok(),
            eta_regex: Regex::new(r"ETA:(\w+)").ok(),
        }
    }

    /// Whether a trimmed line looks like a progress summary.
    pub fn is_progress_line(line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        let lower = line.to_lowercase();
        if NOISE_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return false;
        }
        PROGRESS_INDICATORS
            .iter()
            .any(|indicator| line.contains(indicator))
    }

    /// Feeds one raw output line; returns an update when it should be shown.
    pub fn accept(&mut self, raw: &str) -> Option<DownloadProgress> {
        let line = raw.trim();
        if !Self::is_progress_line(line) {
            return None;
        }
        if self.last_line.as_deref() == Some(line) {
            return None;
        }
        self.last_line = Some(line.to_string());
        Some(self.parse(line))
    }

    /// Extracts the structured fields aria2 puts in a summary line.
    pub fn parse(&self, line: &str) -> DownloadProgress {
        let mut progress = DownloadProgress {
            line: line.chars().take(MAX_STATUS_LEN).collect(),
            seeding: line.contains("SEED"),
            ..Default::default()
        };

        if let Some(caps) = self.size_regex.as_ref().and_then(|re| re.captures(line)) {
            progress.completed = caps.get(1).map(|m| m.as_str().to_string());
            progress.total = caps.get(2).map(|m| m.as_str().to_string());
            progress.percent = caps
                .get(3)
                .and_then(|m| m.as_str().parse::<u8>().ok())
                .map(|p| p.min(100));
        }

        if let Some(caps) = self
            .connections_regex
            .as_ref()
            .and_then(|re| re.captures(line))
        {
            progress.connections = caps.get(1).and_then(|m| m.as_str().parse().ok());
        }

        if let Some(caps) = self.rate_regex.as_ref().and_then(|re| re.captures(line)) {
            progress.download_rate = caps.get(1).map(|m| m.as_str().to_string());
        }

        if let Some(caps) = self.eta_regex.as_ref().and_then(|re| re.captures(line)) {
            progress.eta = caps.get(1).map(|m| m.as_str().to_string());
        }

        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Console output of `aria2c --summary-interval=1 --console-log-level=warn`
    /// for a small magnet download.
    const RECORDED_OUTPUT: &str = "
10/19 12:00:01 [NOTICE] Downloading 1 item(s)

*** Download Progress Summary as of Mon Oct 19 12:00:02 2026 ***
===============================================================================
[#6a6a39 0B/0B CN:12 DL:0B]
FILE: /content/downloads/[METADATA]6a6a39c1b0
-------------------------------------------------------------------------------

[#6a6a39 0B/0B CN:12 DL:0B]
[#2089b0 400.0KiB/33.2MiB(1%) CN:1 DL:115.7KiB ETA:4m51s]
[#2089b0 400.0KiB/33.2MiB(1%) CN:1 DL:115.7KiB ETA:4m51s]
[#2089b0 12.5MiB/33.2MiB(37%) CN:24 DL:2.1MiB ETA:9s]
Download Results:
gid   |stat|avg speed  |path/URI
======+====+===========+=======================================================
2089b0|OK  |   2.3MiB/s|/content/downloads/Some File.mkv

Status Legend:
(OK):download completed.
[#2089b0 SEED(0.0) CN:0 UL:0B]
";

    #[test]
    fn test_recorded_output_filtering() {
        let mut filter = ProgressFilter::new();
        let accepted: Vec<String> = RECORDED_OUTPUT
            .lines()
            .filter_map(|line| filter.accept(line))
            .map(|p| p.line)
            .collect();

        assert_eq!(
            accepted,
            vec![
                "[#6a6a39 0B/0B CN:12 DL:0B]",
                "[#2089b0 400.0KiB/33.2MiB(1%) CN:1 DL:115.7KiB ETA:4m51s]",
                "[#2089b0 12.5MiB/33.2MiB(37%) CN:24 DL:2.1MiB ETA:9s]",
                "[#2089b0 SEED(0.0) CN:0 UL:0B]",
            ]
        );
    }

    #[test]
    fn test_noise_lines_rejected() {
        for line in [
            "",
            "-------------------------------------------------------------------------------",
            "Download Results:",
            "FILE: /content/downloads/[METADATA]6a6a39c1b0",
            "GID: 2089b0 Status:active 12%",
            "URI: http://tracker 50%",
            "10/19 12:00:01 [NOTICE] Downloading 1 item(s)",
        ] {
            assert!(!ProgressFilter::is_progress_line(line), "accepted {:?}", line);
        }
    }

    #[test]
    fn test_duplicate_lines_suppressed() {
        let mut filter = ProgressFilter::new();
        assert!(filter.accept("[#1 1MiB/2MiB(50%) CN:1 DL:1MiB]").is_some());
        assert!(filter.accept("  [#1 1MiB/2MiB(50%) CN:1 DL:1MiB]  ").is_none());
        assert!(filter.accept("[#1 2MiB/2MiB(100%) CN:1 DL:1MiB]").is_some());
    }

    #[test]
    fn test_parse_summary_fields() {
        let filter = ProgressFilter::new();
        let progress =
            filter.parse("[#2089b0 12.5MiB/33.2MiB(37%) CN:24 DL:2.1MiB ETA:9s]");
        assert_eq!(progress.completed.as_deref(), Some("12.5MiB"));
        assert_eq!(progress.total.as_deref(), Some("33.2MiB"));
        assert_eq!(progress.percent, Some(37));
        assert_eq!(progress.connections, Some(24));
        assert_eq!(progress.download_rate.as_deref(), Some("2.1MiB"));
        assert_eq!(progress.eta.as_deref(), Some("9s"));
        assert!(!progress.seeding);
    }

    #[test]
    fn test_parse_metadata_phase() {
        let filter = ProgressFilter::new();
        let progress = filter.parse("[#6a6a39 0B/0B CN:12 DL:0B]");
        assert_eq!(progress.completed.as_deref(), Some("0B"));
        assert_eq!(progress.total.as_deref(), Some("0B"));
        assert_eq!(progress.percent, None);
        assert_eq!(progress.eta, None);
    }

    #[test]
    fn test_parse_seeding() {
        let filter = ProgressFilter::new();
        let progress = filter.parse("[#2089b0 SEED(0.0) CN:0 UL:0B]");
        assert!(progress.seeding);
        assert_eq!(progress.connections, Some(0));
        assert_eq!(progress.download_rate, None);
    }

    #[test]
    fn test_line_truncated_for_display() {
        let filter = ProgressFilter::new();
        let long = format!("[#1 1MiB/2MiB(50%) CN:1 DL:1MiB {}]", "x".repeat(200));
        let progress = filter.parse(&long);
        assert_eq!(progress.line.chars().count(), MAX_STATUS_LEN);
        assert_eq!(progress.percent, Some(50));
    }
}
