//! Archive Assembler: merges every chunk record of a package into one zip
//! and removes the intermediate records.
//!
//! Two passes. First every `temp/{slug}/chunk_i` for `i in [0, total)` is read
//! and decoded; the first absent index aborts with `MissingChunk` and nothing
//! is deleted. Only after the archive is built are all records (and the
//! frozen file list) deleted, in one transaction.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::WorkerError;
use crate::model::ChunkRecord;
use crate::store::{chunk_key, file_list_key, ChunkStore};

/// Deflate level used for every entry.
pub const DEFLATE_LEVEL: i32 = 9;

/// Reads the records for chunks `0..total_chunks` in index order.
///
/// Fails with `MissingChunk` naming the first absent index.
pub async fn load_chunks(
    store: &ChunkStore,
    slug: &str,
    total_chunks: usize,
) -> Result<Vec<ChunkRecord>, WorkerError> {
    // `total_chunks` is caller-supplied; grow as records are found.
    let mut records = Vec::new();
    for index in 0..total_chunks {
        let key = chunk_key(slug, index);
        let Some(blob) = store.get(&key).await? else {
            return Err(WorkerError::MissingChunk { index });
        };
        let record = ChunkRecord::from_json(&blob.value)
            .map_err(|source| WorkerError::CorruptRecord { key, source })?;
        records.push(record);
    }
    Ok(records)
}

/// Builds a deflate-9 zip with every file under `{slug}/`.
///
/// Leading separators are stripped from record paths. Entries are keyed by
/// path: a later record overrides an earlier one for the same path.
/// Intermediate directory entries are emitted before their files.
pub fn build_archive(slug: &str, records: &[ChunkRecord]) -> Result<Vec<u8>, WorkerError> {
    let mut merged: BTreeMap<String, &[u8]> = BTreeMap::new();
    for record in records {
        for (path, content) in &record.files {
            let clean = path.trim_start_matches('/');
            if clean.is_empty() {
                continue;
            }
            if !stays_under_root(clean) {
                tracing::warn!(path = %path, "dropping record path outside the package root");
                continue;
            }
            merged.insert(format!("{}/{}", slug, clean), content.as_slice());
        }
    }

    let mut dirs = BTreeSet::new();
    dirs.insert(format!("{}/", slug));
    for name in merged.keys() {
        let mut end = 0;
        while let Some(pos) = name[end..].find('/') {
            end += pos + 1;
            dirs.insert(name[..end].to_string());
        }
    }

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(DEFLATE_LEVEL));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for dir in &dirs {
        zip.add_directory(dir.as_str(), options)?;
    }
    for (name, content) in &merged {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content)?;
    }
    Ok(zip.finish()?.into_inner())
}

/// True when every `/`-separated segment is a plain name, so the entry
/// cannot resolve outside `{slug}/` on extraction.
fn stays_under_root(path: &str) -> bool {
    !path.contains('\\')
        && path
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// Finalize phase: load all chunks, build the archive, then delete the
/// package's records.
pub async fn assemble(
    store: &ChunkStore,
    slug: &str,
    total_chunks: usize,
) -> Result<Vec<u8>, WorkerError> {
    let records = load_chunks(store, slug, total_chunks).await?;
    for record in &records {
        tracing::debug!(
            chunk = record.chunk_index,
            files = record.files.len(),
            "merging chunk"
        );
    }

    let archive_slug = slug.to_string();
    let (archive, records) = tokio::task::spawn_blocking(move || {
        let archive = build_archive(&archive_slug, &records);
        (archive, records)
    })
    .await?;
    let archive = archive?;

    let mut keys: Vec<String> = (0..total_chunks).map(|i| chunk_key(slug, i)).collect();
    keys.push(file_list_key(slug));
    let removed = store.delete_many(&keys).await?;

    let file_count: usize = records.iter().map(|r| r.files.len()).sum();
    tracing::info!(
        slug,
        chunks = total_chunks,
        files = file_count,
        bytes = archive.len(),
        removed,
        "archive assembled"
    );
    Ok(archive)
}
