//! `chunkzip serve` – run the worker.

use anyhow::Result;
use chunkzip_core::config::ChunkzipConfig;
use chunkzip_core::worker;

pub async fn run_serve(cfg: &ChunkzipConfig, listen: Option<String>) -> Result<()> {
    let mut worker_cfg = cfg.worker.clone();
    if let Some(addr) = listen {
        worker_cfg.listen_addr = addr;
    }
    worker::serve(worker_cfg).await
}
