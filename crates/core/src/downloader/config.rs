//! Configuration for the download runner.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the aria2-based downloader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path to the aria2c binary.
    #[serde(default = "default_aria2c_path")]
    pub aria2c_path: PathBuf,

    /// Seconds to keep seeding after completion.
    #[serde(default)]
    pub seed_time_secs: u32,

    /// Upload bandwidth cap in aria2 notation (e.g. "1K").
    #[serde(default = "default_max_upload_limit")]
    pub max_upload_limit: String,

    /// Interval between progress summaries.
    #[serde(default = "default_summary_interval")]
    pub summary_interval_secs: u32,

    /// aria2 console log level (debug, info, notice, warn, error).
    #[serde(default = "default_console_log_level")]
    pub console_log_level: String,

    /// Optional hard limit on the whole download. `None` waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Additional aria2c arguments, placed before the magnet URI.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_aria2c_path() -> PathBuf {
    PathBuf::from("aria2c")
}

fn default_max_upload_limit() -> String {
    "1K".to_string()
}

fn default_summary_interval() -> u32 {
    1
}

fn default_console_log_level() -> String {
    "warn".to_string()
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            aria2c_path: default_aria2c_path(),
            seed_time_secs: 0,
            max_upload_limit: default_max_upload_limit(),
            summary_interval_secs: default_summary_interval(),
            console_log_level: default_console_log_level(),
            timeout_secs: None,
            extra_args: Vec::new(),
        }
    }
}

impl DownloaderConfig {
    /// Creates a config with a custom aria2c binary.
    pub fn with_binary(aria2c_path: impl Into<PathBuf>) -> Self {
        Self {
            aria2c_path: aria2c_path.into(),
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}
