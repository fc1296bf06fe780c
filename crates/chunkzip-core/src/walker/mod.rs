//! Directory Walker: recursively enumerates every file under a package root
//! by fetching and parsing directory-listing pages.
//!
//! Depth-first, pre-order by listing order. The remote tree is untrusted, so
//! the walk is bounded by a maximum depth and a maximum entry count.

mod parse;
mod source;

pub use parse::{join_path, parse_listing, EntryKind, ListingEntry};
pub use source::{PackageSource, SLUG_PLACEHOLDER};

use crate::error::WorkerError;
use crate::fetch::{self, FetchOptions};
use crate::model::FileEntry;

/// Bounds on a single walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkLimits {
    /// Deepest directory level visited; the package root is depth 0.
    pub max_depth: usize,
    /// Maximum listing entries (files and directories) across the walk.
    pub max_entries: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_entries: 10_000,
        }
    }
}

/// Lists every file under `source`, in listing order.
///
/// Blocking; an empty tree is not an error here (the discovery phase decides).
pub fn discover(
    source: &PackageSource,
    opts: &FetchOptions,
    limits: WalkLimits,
) -> Result<Vec<FileEntry>, WorkerError> {
    let mut walk = Walk {
        source,
        opts,
        limits,
        seen: 0,
        files: Vec::new(),
    };
    walk.visit("", 0)?;
    Ok(walk.files)
}

struct Walk<'a> {
    source: &'a PackageSource,
    opts: &'a FetchOptions,
    limits: WalkLimits,
    seen: usize,
    files: Vec<FileEntry>,
}

impl Walk<'_> {
    fn visit(&mut self, dir: &str, depth: usize) -> Result<(), WorkerError> {
        if depth > self.limits.max_depth {
            return Err(WorkerError::Discovery(format!(
                "directory nesting exceeds {} levels at {}",
                self.limits.max_depth, dir
            )));
        }

        let url = self.source.dir_url(dir);
        tracing::info!("scanning directory: {}", url);
        let resp = fetch::get_ok(&url, self.opts)
            .map_err(|e| WorkerError::Discovery(format!("failed to list {}: {}", url, e)))?;
        let entries = parse_listing(&resp.text());

        self.seen += entries.len();
        if self.seen > self.limits.max_entries {
            return Err(WorkerError::Discovery(format!(
                "listing exceeds {} entries",
                self.limits.max_entries
            )));
        }

        for entry in entries {
            let path = join_path(dir, &entry.name);
            match entry.kind {
                EntryKind::Directory => self.visit(&path, depth + 1)?,
                EntryKind::File => self.files.push(FileEntry {
                    name: entry.name,
                    path,
                }),
            }
        }
        Ok(())
    }
}
