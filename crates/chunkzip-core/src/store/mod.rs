//! Durable keyed blob store (SQLite via sqlx).
//!
//! Holds ChunkRecords and frozen discovery lists between independent phase
//! calls. No in-process state survives a call; this store is the only shared
//! mutable resource.

mod blobs;
mod db;
mod keys;

pub use blobs::{BlobMetadata, StoredBlob};
pub use db::ChunkStore;
pub use keys::{chunk_key, file_list_key, package_prefix};

#[cfg(test)]
pub(crate) use db::open_memory;
