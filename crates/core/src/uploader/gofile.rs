//! GoFile upload client.

use async_trait::async_trait;
use reqwest::{multipart, Body, Client, StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use super::config::UploaderConfig;
use super::error::UploaderError;
use super::traits::Uploader;
use super::types::UploadResult;

/// Status value GoFile uses for success.
const STATUS_OK: &str = "ok";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status: String,
    #[serde(default)]
    data: Option<UploadData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadData {
    download_page: Option<String>,
    id: Option<String>,
    name: Option<String>,
}

/// Uploads files to GoFile with a single streamed multipart POST.
pub struct GofileUploader {
    client: Client,
    config: UploaderConfig,
}

impl GofileUploader {
    pub fn new(config: UploaderConfig) -> Result<Self, UploaderError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| UploaderError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self, UploaderError> {
        Self::new(UploaderConfig::default())
    }

    /// Turns the HTTP response into an upload outcome.
    fn parse_response(
        status: StatusCode,
        body: &str,
    ) -> Result<(String, Option<String>, Option<String>), UploaderError> {
        if status != StatusCode::OK {
            return Err(UploaderError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let response: UploadResponse = serde_json::from_str(body)
            .map_err(|e| UploaderError::MalformedResponse(e.to_string()))?;

        if response.status != STATUS_OK {
            return Err(UploaderError::Rejected {
                status: response.status,
                message: response
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        let data = response.data.unwrap_or_default();
        let download_page = data.download_page.ok_or_else(|| {
            UploaderError::MalformedResponse("missing data.downloadPage".to_string())
        })?;

        Ok((download_page, data.id, data.name))
    }
}

#[async_trait]
impl Uploader for GofileUploader {
    fn name(&self) -> &str {
        "gofile"
    }

    async fn upload(&self, path: &Path) -> Result<UploadResult, UploaderError> {
        let start = Instant::now();

        let file = File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UploaderError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                UploaderError::Io(e)
            }
        })?;
        let size_bytes = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.zip".to_string());

        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = multipart::Part::stream_with_length(body, size_bytes).file_name(file_name.clone());
        let form = multipart::Form::new().part("file", part);

        info!(
            endpoint = %self.config.endpoint,
            file = %file_name,
            size_bytes,
            "Uploading file"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), "Upload response received");

        let (download_page, file_id, host_name) =
            Self::parse_response(status, &body).inspect_err(|e| {
                warn!(error = %e, "Upload failed");
            })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(download_page = %download_page, duration_ms, "Upload successful");

        Ok(UploadResult {
            download_page,
            file_id,
            file_name: host_name.unwrap_or(file_name),
            size_bytes,
            duration_ms,
        })
    }

    async fn validate(&self) -> Result<(), UploaderError> {
        let url = Url::parse(&self.config.endpoint)
            .map_err(|e| UploaderError::InvalidEndpoint(format!("{}: {}", self.config.endpoint, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(UploaderError::InvalidEndpoint(format!(
                "unsupported scheme {}",
                other
            ))),
        }
    }
}
