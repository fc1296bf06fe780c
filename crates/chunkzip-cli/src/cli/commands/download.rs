//! `chunkzip download` – drive a worker through every phase for one package.

use anyhow::Result;
use chunkzip_core::config::{self, ChunkzipConfig};
use chunkzip_core::orchestrator::{DownloadRequest, Orchestrator, ProgressEvent, WorkerClient};
use std::path::PathBuf;

pub async fn run_download(
    cfg: &ChunkzipConfig,
    slug: &str,
    worker_url: Option<&str>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let env_url = std::env::var(config::WORKER_URL_ENV).ok();
    let base = config::resolve_worker_url(worker_url, env_url.as_deref(), &cfg.client);
    tracing::info!(slug, worker = %base, "starting download");
    println!("Starting download of plugin: {}", slug);

    let client = WorkerClient::new(&base, cfg.client.fetch_options());
    let request = DownloadRequest {
        slug: slug.to_string(),
        download_dir: output_dir.unwrap_or_else(|| cfg.client.download_dir.clone()),
        chunk_delay: cfg.client.chunk_delay(),
    };

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressEvent>(16);
    let progress_handle = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            print_event(&event);
        }
    });

    let mut orchestrator = Orchestrator::new(client).with_progress(progress_tx);
    let result = orchestrator.run(&request).await;
    drop(orchestrator);
    let _ = progress_handle.await;

    result.map(|_| ()).map_err(Into::into)
}

fn print_event(event: &ProgressEvent) {
    match event {
        ProgressEvent::Discovered {
            total_files,
            total_chunks,
            preview,
        } => {
            println!(
                "Found {} files to process in {} chunks",
                total_files, total_chunks
            );
            println!("Files found:");
            for path in preview {
                println!("  {}", path);
            }
            if *total_files > preview.len() {
                println!("  ...");
            }
        }
        ProgressEvent::ChunkStarted { index, total } => {
            println!("Processing chunk {}/{}", index + 1, total);
        }
        ProgressEvent::ChunkDone {
            index,
            total,
            files_processed,
        } => {
            println!(
                "Processed chunk {}/{} ({} files)",
                index + 1,
                total,
                files_processed
            );
        }
        ProgressEvent::Finalizing => println!("Generating final ZIP file..."),
        ProgressEvent::Saved {
            path,
            bytes,
            sha256,
        } => {
            println!("Successfully downloaded to {} ({} bytes)", path.display(), bytes);
            println!("sha256 {}", sha256);
        }
    }
}
