//! CLI command handlers. Each command is in its own file.

mod checksum;
mod download;
mod purge;
mod serve;

pub use checksum::run_checksum;
pub use download::run_download;
pub use purge::run_purge;
pub use serve::run_serve;
