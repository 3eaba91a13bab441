use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Upload endpoint is a non-empty http(s) URL
/// - Tool paths are not empty
/// - Summary interval is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let endpoint = config.uploader.endpoint.trim();
    if endpoint.is_empty() {
        return Err(ConfigError::ValidationError(
            "uploader.endpoint cannot be empty".to_string(),
        ));
    }
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "uploader.endpoint must be an http(s) URL, got {}",
            endpoint
        )));
    }

    if config.downloader.aria2c_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "downloader.aria2c_path cannot be empty".to_string(),
        ));
    }
    if config.archiver.zip_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "archiver.zip_path cannot be empty".to_string(),
        ));
    }

    if config.downloader.summary_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "downloader.summary_interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
