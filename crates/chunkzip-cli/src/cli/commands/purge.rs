//! `chunkzip purge` – drop a package's leftover chunk records.

use anyhow::Result;
use chunkzip_core::config::ChunkzipConfig;
use chunkzip_core::slug::validate_slug;
use chunkzip_core::store::{package_prefix, ChunkStore};

pub async fn run_purge(cfg: &ChunkzipConfig, slug: &str) -> Result<()> {
    let slug = validate_slug(slug)?;
    let store = match &cfg.worker.store_path {
        Some(path) => ChunkStore::open_at(path).await?,
        None => ChunkStore::open_default().await?,
    };
    let keys = store.keys_with_prefix(&package_prefix(slug)).await?;
    if keys.is_empty() {
        println!("No records for {}.", slug);
        return Ok(());
    }
    let removed = store.delete_many(&keys).await?;
    tracing::info!(slug, removed, "purged leftover records");
    println!("Removed {} record(s) for {}.", removed, slug);
    Ok(())
}
