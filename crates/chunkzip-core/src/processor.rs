//! Chunk Processor: fetches the files assigned to one chunk and persists them
//! as a single ChunkRecord.
//!
//! Per-file fetch failures are soft: logged, skipped, not retried. The call
//! fails only if the durable write fails. Re-running a chunk replaces its
//! record, so the phase is safe to retry.

use std::collections::{BTreeMap, VecDeque};
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};

use crate::error::WorkerError;
use crate::fetch::{self, FetchOptions};
use crate::model::{ChunkOutcome, ChunkRecord, FileEntry};
use crate::store::{chunk_key, BlobMetadata, ChunkStore};
use crate::walker::PackageSource;

/// Bytes fetched for one chunk plus the number of files left out.
#[derive(Debug, Default)]
pub struct FetchedFiles {
    pub files: BTreeMap<String, Vec<u8>>,
    pub skipped: usize,
}

/// Fetches `files` with up to `concurrency` parallel GETs. Blocking.
///
/// Each file lands under its own path key, so fetch order does not matter.
pub fn fetch_files(
    source: &PackageSource,
    files: &[FileEntry],
    opts: &FetchOptions,
    concurrency: usize,
) -> FetchedFiles {
    if files.is_empty() {
        return FetchedFiles::default();
    }

    let work: Mutex<VecDeque<&FileEntry>> = Mutex::new(files.iter().collect());
    let (tx, rx) = mpsc::channel::<(String, Option<Vec<u8>>)>();
    let num_workers = concurrency.max(1).min(files.len());

    std::thread::scope(|scope| {
        for _ in 0..num_workers {
            let work = &work;
            let tx = tx.clone();
            scope.spawn(move || loop {
                let Some(file) = next_file(work) else { break };
                let url = source.file_url(&file.path);
                tracing::debug!("processing file: {}", file.path);
                let body = match fetch::get_ok(&url, opts) {
                    Ok(resp) => Some(resp.body),
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "failed to fetch file, skipping");
                        None
                    }
                };
                if tx.send((file.path.clone(), body)).is_err() {
                    break;
                }
            });
        }
        drop(tx);
    });

    let mut out = FetchedFiles::default();
    for (path, body) in rx {
        match body {
            Some(bytes) => {
                out.files.insert(path, bytes);
            }
            None => out.skipped += 1,
        }
    }
    out
}

/// Pops the next queued file. A queue poisoned by a panicking worker is
/// still drained so every file is either fetched or counted as skipped.
fn next_file<'a>(work: &Mutex<VecDeque<&'a FileEntry>>) -> Option<&'a FileEntry> {
    work.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

/// Persists already-fetched bytes as the record for `chunk_index`.
pub async fn persist_chunk(
    store: &ChunkStore,
    slug: &str,
    chunk_index: usize,
    fetched: FetchedFiles,
) -> Result<ChunkOutcome, WorkerError> {
    let record = ChunkRecord {
        files: fetched.files,
        chunk_index,
    };
    let payload = record
        .to_json()
        .map_err(|e| WorkerError::persist(chunk_index, e))?;
    store
        .put(&chunk_key(slug, chunk_index), &payload, &BlobMetadata::json())
        .await
        .map_err(|e| WorkerError::persist(chunk_index, e))?;

    Ok(ChunkOutcome {
        chunk_index,
        files_processed: record.files.len(),
        files_skipped: fetched.skipped,
    })
}

/// Fetches and persists one chunk.
pub async fn process_chunk(
    store: &ChunkStore,
    source: &PackageSource,
    files: Vec<FileEntry>,
    chunk_index: usize,
    opts: FetchOptions,
    concurrency: usize,
) -> Result<ChunkOutcome, WorkerError> {
    let src = source.clone();
    let fetched = tokio::task::spawn_blocking(move || {
        fetch_files(&src, &files, &opts, concurrency)
    })
    .await?;

    let outcome = persist_chunk(store, source.slug(), chunk_index, fetched).await?;
    tracing::info!(
        slug = source.slug(),
        chunk = chunk_index,
        processed = outcome.files_processed,
        skipped = outcome.files_skipped,
        "chunk persisted"
    );
    Ok(outcome)
}
