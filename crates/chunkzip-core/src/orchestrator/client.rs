//! Blocking calls to a worker's `/generate-zip/{slug}` endpoint.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::fetch::{self, FetchOptions, FetchResponse};
use crate::model::{ChunkOutcome, DiscoveryResult};
use crate::worker::FINALIZE_CHUNK;

/// Worker base URL plus request options.
#[derive(Debug, Clone)]
pub struct WorkerClient {
    base: String,
    opts: FetchOptions,
}

/// `{status, error}` part shared by every JSON reply.
#[derive(Debug, Deserialize)]
struct StatusField {
    status: Option<String>,
    error: Option<String>,
}

impl WorkerClient {
    pub fn new(base: &str, opts: FetchOptions) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            opts,
        }
    }

    pub fn discovery_url(&self, slug: &str) -> String {
        format!("{}/generate-zip/{}", self.base, slug)
    }

    pub fn chunk_url(&self, slug: &str, index: usize, total: usize) -> String {
        format!("{}?chunk={}&total={}", self.discovery_url(slug), index, total)
    }

    pub fn finalize_url(&self, slug: &str, total: usize) -> String {
        format!(
            "{}?chunk={}&total={}",
            self.discovery_url(slug),
            FINALIZE_CHUNK,
            total
        )
    }

    pub fn discover(&self, slug: &str) -> Result<DiscoveryResult> {
        let resp = self.call(&self.discovery_url(slug))?;
        decode_json(&resp)
    }

    pub fn process_chunk(&self, slug: &str, index: usize, total: usize) -> Result<ChunkOutcome> {
        let resp = self.call(&self.chunk_url(slug, index, total))?;
        decode_json(&resp)
    }

    pub fn finalize(&self, slug: &str, total: usize) -> Result<Vec<u8>> {
        let resp = self.call(&self.finalize_url(slug, total))?;
        Ok(resp.body)
    }

    fn call(&self, url: &str) -> Result<FetchResponse> {
        tracing::debug!("GET {}", url);
        let resp = fetch::get(url, &self.opts).with_context(|| format!("request to {}", url))?;
        if !resp.is_success() {
            bail!("HTTP {}: {}", resp.status, error_message(&resp));
        }
        Ok(resp)
    }
}

/// Best message from an error reply: the JSON `error` field if present,
/// else the raw body.
fn error_message(resp: &FetchResponse) -> String {
    match serde_json::from_slice::<StatusField>(&resp.body) {
        Ok(StatusField {
            error: Some(msg), ..
        }) => msg,
        _ => resp.text().trim().to_string(),
    }
}

/// Decodes a success reply, rejecting `status: "error"` bodies.
fn decode_json<T: DeserializeOwned>(resp: &FetchResponse) -> Result<T> {
    let status: StatusField =
        serde_json::from_slice(&resp.body).context("worker reply is not JSON")?;
    if status.status.as_deref() == Some("error") {
        bail!(status.error.unwrap_or_else(|| "unknown worker error".to_string()));
    }
    serde_json::from_slice(&resp.body).context("unexpected worker reply shape")
}
