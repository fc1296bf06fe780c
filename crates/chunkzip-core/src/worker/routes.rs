//! Request handlers and phase execution.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;

use super::phase::Phase;
use super::WorkerState;
use crate::assembler;
use crate::error::WorkerError;
use crate::model::{ChunkOutcome, DiscoveryResult, FileEntry};
use crate::planner::{chunk_slice, plan_chunks};
use crate::processor;
use crate::slug::validate_slug;
use crate::store::{file_list_key, BlobMetadata};
use crate::walker::{self, PackageSource};

/// Result of one successful phase call.
#[derive(Debug)]
pub enum PhaseOutput {
    Discovered(DiscoveryResult),
    Processed(ChunkOutcome),
    Archive(Vec<u8>),
}

#[derive(Serialize)]
struct Success<T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    body: T,
}

#[derive(Serialize)]
struct Failure {
    status: &'static str,
    error: String,
}

impl PhaseOutput {
    fn into_response(self, slug: &str) -> Response {
        match self {
            PhaseOutput::Discovered(body) => Json(Success {
                status: "success",
                body,
            })
            .into_response(),
            PhaseOutput::Processed(body) => Json(Success {
                status: "success",
                body,
            })
            .into_response(),
            PhaseOutput::Archive(bytes) => (
                [
                    (header::CONTENT_TYPE, "application/zip".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}.zip\"", slug),
                    ),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                Body::from(bytes),
            )
                .into_response(),
        }
    }
}

fn error_response(err: &WorkerError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Failure {
            status: "error",
            error: err.to_string(),
        }),
    )
        .into_response()
}

pub(super) async fn generate_zip(
    State(state): State<WorkerState>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let phase = Phase::from_query(
        params.get("chunk").map(String::as_str),
        params.get("total").map(String::as_str),
    );
    let result = match phase {
        Ok(phase) => {
            tracing::info!(slug = %slug, phase = phase.name(), "phase call");
            run_phase(&state, &slug, phase).await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(output) => output.into_response(&slug),
        Err(e) => {
            tracing::error!(slug = %slug, error = %e, "phase failed");
            error_response(&e)
        }
    }
}

pub(super) async fn missing_slug() -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "text/plain")],
        "Plugin slug required",
    )
        .into_response()
}

pub(super) async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Executes one phase for `slug` against the worker's store and source.
pub async fn run_phase(
    state: &WorkerState,
    slug: &str,
    phase: Phase,
) -> Result<PhaseOutput, WorkerError> {
    let slug = validate_slug(slug)?;
    match phase {
        Phase::Discover => discover_phase(state, slug).await.map(PhaseOutput::Discovered),
        Phase::ProcessChunk { index, total } => chunk_phase(state, slug, index, total)
            .await
            .map(PhaseOutput::Processed),
        Phase::Finalize { total } => assembler::assemble(&state.store, slug, total)
            .await
            .map(PhaseOutput::Archive),
    }
}

async fn walk(state: &WorkerState, slug: &str) -> Result<Vec<FileEntry>, WorkerError> {
    let source = PackageSource::from_template(&state.cfg.source_url, slug)?;
    let opts = state.cfg.fetch_options();
    let limits = state.cfg.walk_limits();
    tokio::task::spawn_blocking(move || walker::discover(&source, &opts, limits)).await?
}

async fn discover_phase(state: &WorkerState, slug: &str) -> Result<DiscoveryResult, WorkerError> {
    let files = walk(state, slug).await?;
    if files.is_empty() {
        return Err(WorkerError::Discovery("No files found for plugin".to_string()));
    }

    let frozen = serde_json::to_vec(&files)?;
    state
        .store
        .put(&file_list_key(slug), &frozen, &BlobMetadata::json())
        .await?;

    let total_chunks = plan_chunks(files.len(), state.cfg.chunk_size);
    tracing::info!(slug, files = files.len(), chunks = total_chunks, "discovery complete");
    Ok(DiscoveryResult {
        total_files: files.len(),
        total_chunks,
        files,
    })
}

/// File list for chunk processing: the list frozen at discovery when
/// present, else a fresh walk.
async fn chunk_files(state: &WorkerState, slug: &str) -> Result<Vec<FileEntry>, WorkerError> {
    let key = file_list_key(slug);
    if let Some(blob) = state.store.get(&key).await? {
        return serde_json::from_slice(&blob.value)
            .map_err(|source| WorkerError::CorruptRecord { key, source });
    }
    tracing::debug!(slug, "no frozen file list, walking remote tree again");
    walk(state, slug).await
}

async fn chunk_phase(
    state: &WorkerState,
    slug: &str,
    index: usize,
    total: usize,
) -> Result<ChunkOutcome, WorkerError> {
    let files = chunk_files(state, slug).await?;
    let assigned = chunk_slice(&files, index, total).to_vec();
    let source = PackageSource::from_template(&state.cfg.source_url, slug)?;
    processor::process_chunk(
        &state.store,
        &source,
        assigned,
        index,
        state.cfg.fetch_options(),
        state.cfg.fetch_concurrency,
    )
    .await
}
