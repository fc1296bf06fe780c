//! Protocol Orchestrator: drives one package through
//! `Discovering → ProcessingChunk(i)… → Finalizing → Done`.
//!
//! Chunk calls are strictly sequential with a fixed pause between them. Any
//! failure moves to `Failed` and aborts the run; there is no resume, a new
//! run starts again from discovery.

mod client;

pub use client::WorkerClient;

use anyhow::Context;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::checksum;
use crate::model::DiscoveryResult;

/// Number of discovered paths echoed back to the user.
pub const PREVIEW_FILES: usize = 5;

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Discovering,
    ProcessingChunk { index: usize, total: usize },
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Discovering => write!(f, "discovery"),
            RunState::ProcessingChunk { index, total } => {
                write!(f, "chunk {}/{}", index + 1, total)
            }
            RunState::Finalizing => write!(f, "finalize"),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// A run that ended in `Failed`, with the state it failed in.
#[derive(Debug, thiserror::Error)]
#[error("{phase} failed: {message}")]
pub struct PhaseFailure {
    pub phase: RunState,
    pub message: String,
}

impl PhaseFailure {
    fn new(phase: RunState, err: anyhow::Error) -> Self {
        Self {
            phase,
            message: format!("{:#}", err),
        }
    }
}

/// Progress notifications for a console or log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Discovered {
        total_files: usize,
        total_chunks: usize,
        preview: Vec<String>,
    },
    ChunkStarted {
        index: usize,
        total: usize,
    },
    ChunkDone {
        index: usize,
        total: usize,
        files_processed: usize,
    },
    Finalizing,
    Saved {
        path: PathBuf,
        bytes: u64,
        sha256: String,
    },
}

/// What to download and where.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub slug: String,
    pub download_dir: PathBuf,
    pub chunk_delay: Duration,
}

/// Drives the whole multi-phase sequence for one package.
pub struct Orchestrator {
    client: WorkerClient,
    state: RunState,
    progress: Option<mpsc::Sender<ProgressEvent>>,
}

impl Orchestrator {
    pub fn new(client: WorkerClient) -> Self {
        Self {
            client,
            state: RunState::Discovering,
            progress: None,
        }
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "orchestrator transition");
        self.state = next;
    }

    async fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(event).await;
        }
    }

    fn fail(&mut self, err: anyhow::Error) -> PhaseFailure {
        let failure = PhaseFailure::new(self.state, err);
        tracing::error!("{}", failure);
        self.transition(RunState::Failed);
        failure
    }

    /// Runs discovery, every chunk, and finalize; writes `{dir}/{slug}.zip`.
    pub async fn run(&mut self, req: &DownloadRequest) -> Result<PathBuf, PhaseFailure> {
        self.transition(RunState::Discovering);
        let plan = match self.discover(&req.slug).await {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail(e)),
        };

        for index in 0..plan.total_chunks {
            self.transition(RunState::ProcessingChunk {
                index,
                total: plan.total_chunks,
            });
            if let Err(e) = self.process(&req.slug, index, plan.total_chunks).await {
                return Err(self.fail(e));
            }
            tokio::time::sleep(req.chunk_delay).await;
        }

        self.transition(RunState::Finalizing);
        self.emit(ProgressEvent::Finalizing).await;
        let path = match self.finalize(req, plan.total_chunks).await {
            Ok(path) => path,
            Err(e) => return Err(self.fail(e)),
        };
        self.transition(RunState::Done);
        Ok(path)
    }

    async fn discover(&self, slug: &str) -> anyhow::Result<DiscoveryResult> {
        let client = self.client.clone();
        let slug = slug.to_string();
        let plan = tokio::task::spawn_blocking(move || client.discover(&slug)).await??;
        tracing::info!(
            files = plan.total_files,
            chunks = plan.total_chunks,
            "discovery succeeded"
        );
        self.emit(ProgressEvent::Discovered {
            total_files: plan.total_files,
            total_chunks: plan.total_chunks,
            preview: plan
                .files
                .iter()
                .take(PREVIEW_FILES)
                .map(|f| f.path.clone())
                .collect(),
        })
        .await;
        Ok(plan)
    }

    async fn process(&self, slug: &str, index: usize, total: usize) -> anyhow::Result<()> {
        self.emit(ProgressEvent::ChunkStarted { index, total }).await;
        let client = self.client.clone();
        let slug = slug.to_string();
        let outcome =
            tokio::task::spawn_blocking(move || client.process_chunk(&slug, index, total))
                .await??;
        self.emit(ProgressEvent::ChunkDone {
            index,
            total,
            files_processed: outcome.files_processed,
        })
        .await;
        Ok(())
    }

    async fn finalize(&self, req: &DownloadRequest, total: usize) -> anyhow::Result<PathBuf> {
        let client = self.client.clone();
        let slug = req.slug.clone();
        let archive = tokio::task::spawn_blocking(move || client.finalize(&slug, total)).await??;

        let path = save_archive(&req.download_dir, &req.slug, &archive).await?;
        let sha_path = path.clone();
        let sha256 = tokio::task::spawn_blocking(move || checksum::sha256_path(&sha_path)).await??;
        tracing::info!(path = %path.display(), sha256 = %sha256, "archive saved");
        self.emit(ProgressEvent::Saved {
            path: path.clone(),
            bytes: archive.len() as u64,
            sha256,
        })
        .await;
        Ok(path)
    }
}

/// Writes `bytes` to `{dir}/{slug}.zip` through a `.part` file and rename.
pub async fn save_archive(dir: &Path, slug: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("create dir: {}", dir.display()))?;
    let final_path = dir.join(format!("{}.zip", slug));
    let part = temp_path(&final_path);
    tokio::fs::write(&part, bytes)
        .await
        .with_context(|| format!("write {}", part.display()))?;
    tokio::fs::rename(&part, &final_path)
        .await
        .with_context(|| format!("rename {} -> {}", part.display(), final_path.display()))?;
    Ok(final_path)
}

/// Path for the temp file: appends `.part` to the final path.
fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}
