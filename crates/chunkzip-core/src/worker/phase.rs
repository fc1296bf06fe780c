//! Decode `chunk` / `total` query parameters into a protocol phase.

use crate::error::WorkerError;

/// `chunk` value selecting the finalize phase.
pub const FINALIZE_CHUNK: i64 = -2;

/// `chunk` value (also the default when absent) selecting discovery.
pub const DISCOVER_CHUNK: i64 = -1;

/// One of the three protocol phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Walk the remote tree and report chunk counts.
    Discover,
    /// Fetch and persist chunk `index` of `total`.
    ProcessChunk { index: usize, total: usize },
    /// Assemble `total` chunks into the archive.
    Finalize { total: usize },
}

impl Phase {
    /// Missing parameters default to `-1`. Discovery ignores `total`.
    /// Otherwise non-numeric values and any combination other than the
    /// three phases are `InvalidRequest`.
    pub fn from_query(chunk: Option<&str>, total: Option<&str>) -> Result<Self, WorkerError> {
        let chunk = parse_param(chunk)?;
        if chunk == DISCOVER_CHUNK {
            return Ok(Phase::Discover);
        }

        let total = usize::try_from(parse_param(total)?)
            .ok()
            .filter(|t| *t > 0)
            .ok_or(WorkerError::InvalidRequest)?;
        if chunk == FINALIZE_CHUNK {
            return Ok(Phase::Finalize { total });
        }
        let index = usize::try_from(chunk).map_err(|_| WorkerError::InvalidRequest)?;
        Ok(Phase::ProcessChunk { index, total })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Discover => "discover",
            Phase::ProcessChunk { .. } => "process-chunk",
            Phase::Finalize { .. } => "finalize",
        }
    }
}

fn parse_param(raw: Option<&str>) -> Result<i64, WorkerError> {
    match raw {
        None => Ok(-1),
        Some(s) => s.trim().parse().map_err(|_| WorkerError::InvalidRequest),
    }
}
