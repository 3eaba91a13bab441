//! Runs the pipeline with the real adapters against stand-in tools.
//!
//! aria2c and zip are replaced by small shell scripts and the upload host
//! by a wiremock server, so the subprocess and HTTP plumbing is exercised
//! without network access.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use magnetdrop_core::{
    testing::fixtures, AbortReason, ArchiverConfig, Aria2Downloader, DownloaderConfig,
    GofileUploader, Pipeline, PipelineState, UploaderConfig, ZipArchiver,
};

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Writes one file into `--dir` and exits with `code`.
fn fake_aria2c(dir: &Path, code: i32) -> PathBuf {
    script(
        dir,
        "fake-aria2c",
        &format!(
            r#"for arg in "$@"; do
  case "$arg" in --dir=*) dir="${{arg#--dir=}}" ;; esac
done
mkdir -p "$dir/My Cool File"
echo "[#1 1.0MiB/1.0MiB(100%) CN:2 DL:1.0MiB]"
printf 'payload' > "$dir/My Cool File/video.mkv"
exit {}"#,
            code
        ),
    )
}

/// Mimics `zip -r -m <archive> .`: writes the archive and empties the cwd.
fn fake_zip(dir: &Path) -> PathBuf {
    script(
        dir,
        "fake-zip",
        r#"archive=""
for arg in "$@"; do
  case "$arg" in -*) ;; .) ;; *) archive="$arg" ;; esac
done
printf 'PK' > "$archive"
rm -rf ./*"#,
    )
}

async fn gofile(server: &MockServer) -> GofileUploader {
    GofileUploader::new(UploaderConfig::with_endpoint(format!(
        "{}/uploadfile",
        server.uri()
    )))
    .unwrap()
}

#[tokio::test]
async fn test_full_run_with_stand_in_tools() {
    let tools = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uploadfile"))
        .and(body_string_contains("filename=\"My_Cool_File.zip\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": { "downloadPage": "https://gofile.io/d/Xy12Ab", "id": "0c8f5e" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(
        fixtures::paths_under(work.path()),
        Aria2Downloader::new(DownloaderConfig::with_binary(fake_aria2c(tools.path(), 0))),
        ZipArchiver::new(ArchiverConfig::with_binary(fake_zip(tools.path()))),
        gofile(&server).await,
    );

    let report = pipeline.run(fixtures::COOL_FILE_MAGNET).await;

    assert_eq!(report.final_state, PipelineState::Done, "{:?}", report.abort_reason);
    assert_eq!(report.download_page(), Some("https://gofile.io/d/Xy12Ab"));
    assert!(report.cleanup.is_clean());
    assert!(!work.path().join("My_Cool_File.zip").exists());
    assert!(!work.path().join("downloads").exists());
}

#[tokio::test]
async fn test_engine_failure_never_reaches_zip_or_host() {
    let tools = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(
        fixtures::paths_under(work.path()),
        Aria2Downloader::new(DownloaderConfig::with_binary(fake_aria2c(tools.path(), 1))),
        ZipArchiver::new(ArchiverConfig::with_binary(tools.path().join("no-such-zip"))),
        gofile(&server).await,
    );

    let report = pipeline.run(fixtures::COOL_FILE_MAGNET).await;

    match report.abort_reason {
        Some(AbortReason::DownloadFailed(ref e)) => assert_eq!(e.exit_code(), Some(1)),
        ref other => panic!("unexpected abort reason: {:?}", other),
    }
    assert_eq!(report.final_state, PipelineState::Aborted);
    assert!(!work.path().join("downloads").exists());
}

#[tokio::test]
async fn test_preflight_flags_missing_engine() {
    let work = TempDir::new().unwrap();
    let server = MockServer::start().await;

    let pipeline = Pipeline::new(
        fixtures::paths_under(work.path()),
        Aria2Downloader::new(DownloaderConfig::with_binary(work.path().join("no-aria2c"))),
        ZipArchiver::with_defaults(),
        gofile(&server).await,
    );

    let err = pipeline.preflight().await.unwrap_err();
    assert!(err.to_string().contains("downloader"));
}
