//! Worker HTTP surface: `GET /generate-zip/{slug}` with phase parameters.
//!
//! Every call is stateless; cross-call state lives in the chunk store.

mod phase;
mod routes;

pub use phase::{Phase, DISCOVER_CHUNK, FINALIZE_CHUNK};
pub use routes::{run_phase, PhaseOutput};

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::config::WorkerConfig;
use crate::store::ChunkStore;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct WorkerState {
    pub store: ChunkStore,
    pub cfg: Arc<WorkerConfig>,
}

impl WorkerState {
    pub fn new(store: ChunkStore, cfg: WorkerConfig) -> Self {
        Self {
            store,
            cfg: Arc::new(cfg),
        }
    }
}

/// Routes for the archive protocol. Unknown paths get `404 Not found`.
pub fn router(state: WorkerState) -> Router {
    Router::new()
        .route("/generate-zip", get(routes::missing_slug))
        .route("/generate-zip/", get(routes::missing_slug))
        .route("/generate-zip/{slug}", get(routes::generate_zip))
        .fallback(routes::not_found)
        .with_state(state)
}

/// Opens the configured store and serves until the process is stopped.
pub async fn serve(cfg: WorkerConfig) -> Result<()> {
    let store = match &cfg.store_path {
        Some(path) => ChunkStore::open_at(path).await?,
        None => ChunkStore::open_default().await?,
    };
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("bind {}", cfg.listen_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("worker listening on http://{}", addr);
    println!("Worker listening on http://{}", addr);

    axum::serve(listener, router(WorkerState::new(store, cfg)))
        .await
        .context("worker server failed")?;
    Ok(())
}
