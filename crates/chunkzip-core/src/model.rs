//! Data carried between phases: discovered files, discovery summaries and
//! persisted chunk payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One remote file. `path` is slash-separated from the package root and
/// always starts with `/`; it is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
}

/// Discovery phase response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    pub total_files: usize,
    pub total_chunks: usize,
    pub files: Vec<FileEntry>,
}

/// Chunk-processing phase response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkOutcome {
    pub chunk_index: usize,
    pub files_processed: usize,
    /// Files whose fetch failed and were left out of the record.
    #[serde(skip)]
    pub files_skipped: usize,
}

/// Persisted payload of one chunk: path → raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    pub files: BTreeMap<String, Vec<u8>>,
    pub chunk_index: usize,
}

impl ChunkRecord {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
