mod report;
mod status;

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magnetdrop_core::{
    load_config_or_default, validate_config, Aria2Downloader, DownloadProgress, EventCallback,
    GofileUploader, Pipeline, PipelineEvent, ZipArchiver,
};

use status::StatusLine;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Progress updates buffered between the downloader and the renderer
const PROGRESS_BUFFER_SIZE: usize = 32;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    // Logs go to stderr; stdout is for the user
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::var("MAGNETDROP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("magnetdrop.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!(
        download_root = %config.paths.download_root.display(),
        archive_root = %config.paths.archive_root.display(),
        endpoint = %config.uploader.endpoint,
        "Configuration loaded"
    );

    println!("magnetdrop {}", VERSION);
    println!("Magnet link in, shareable download link out.");
    println!();

    let uploader =
        GofileUploader::new(config.uploader.clone()).context("Failed to create uploader")?;
    let pipeline = Pipeline::new(
        config.paths.clone(),
        Aria2Downloader::new(config.downloader.clone()),
        ZipArchiver::new(config.archiver.clone()),
        uploader,
    );

    if let Err(e) = pipeline.preflight().await {
        eprintln!("{}", e);
        eprintln!("{}", report::INSTALL_HINT);
        return Ok(1);
    }

    let input = prompt("Enter magnet link: ")
        .await
        .context("Failed to read magnet link from stdin")?;

    let status = Arc::new(Mutex::new(StatusLine::new()));
    let (progress_tx, mut progress_rx) = mpsc::channel::<DownloadProgress>(PROGRESS_BUFFER_SIZE);

    let renderer_status = Arc::clone(&status);
    let renderer = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            if let Ok(mut line) = renderer_status.lock() {
                let _ = line.update(&mut std::io::stdout(), &progress.line);
            }
        }
    });

    let event_status = Arc::clone(&status);
    let on_event: EventCallback = Arc::new(move |event: &PipelineEvent| {
        if let Some(message) = report::describe_event(event) {
            if let Ok(mut line) = event_status.lock() {
                let _ = line.println(&mut std::io::stdout(), &message);
            }
        }
    });

    let pipeline = pipeline
        .with_progress(progress_tx)
        .with_event_callback(on_event);

    let interrupt = async {
        // Without a handler the run simply cannot be interrupted
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let result = pipeline.run_until(&input, interrupt).await;

    // Closing the channel stops the renderer
    drop(pipeline);
    let _ = renderer.await;

    if let Ok(mut line) = status.lock() {
        let _ = line.finish(&mut std::io::stdout());
    }
    println!();
    println!("{}", report::summary(&result));

    Ok(report::exit_code(&result))
}

/// Prints `message` and reads one line from stdin. EOF yields an empty string.
async fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line.trim().to_string())
}
