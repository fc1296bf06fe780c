//! Worker-side error type. Every variant maps to a JSON error envelope.

/// Errors raised by the discovery, chunk-processing and finalize phases.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Listing unreachable or unparseable, a walk guard tripped, or no files found.
    #[error("{0}")]
    Discovery(String),

    /// The durable write for a chunk record failed; the whole chunk call fails.
    #[error("failed to persist chunk {index}: {source}")]
    ChunkPersist {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Assembly found no record for this chunk index.
    #[error("Missing chunk {index}")]
    MissingChunk { index: usize },

    /// `chunk` / `total` query parameters did not name a phase.
    #[error("Invalid request parameters")]
    InvalidRequest,

    /// Slug cannot be used as a key or URL segment.
    #[error("invalid package slug: {0:?}")]
    InvalidSlug(String),

    /// A stored chunk record could not be decoded.
    #[error("corrupt record at {key}: {source}")]
    CorruptRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store: {0}")]
    Store(#[from] sqlx::Error),

    #[error("archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl WorkerError {
    pub(crate) fn persist<E>(index: usize, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        WorkerError::ChunkPersist {
            index,
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_chunk_names_index() {
        let e = WorkerError::MissingChunk { index: 3 };
        assert_eq!(e.to_string(), "Missing chunk 3");
    }

    #[test]
    fn invalid_request_message_is_stable() {
        assert_eq!(
            WorkerError::InvalidRequest.to_string(),
            "Invalid request parameters"
        );
    }

    #[test]
    fn persist_wraps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let e = WorkerError::persist(2, io);
        assert!(e.to_string().contains("chunk 2"));
        assert!(e.to_string().contains("disk full"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
