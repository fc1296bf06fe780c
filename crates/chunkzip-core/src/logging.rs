//! Tracing setup. Each role logs to its own file under the XDG state dir;
//! the worker additionally mirrors to stderr, the download client keeps
//! stdout/stderr for progress and errors.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,chunkzip=debug,chunkzip_core=debug";

/// Which process is logging; selects the log file and the stderr mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRole {
    Worker,
    Client,
}

impl LogRole {
    pub fn file_name(self) -> &'static str {
        match self {
            LogRole::Worker => "worker.log",
            LogRole::Client => "client.log",
        }
    }
}

/// `~/.local/state/chunkzip/{worker,client}.log`.
pub fn log_path(role: LogRole) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chunkzip")?;
    Ok(xdg_dirs.get_state_home().join("chunkzip").join(role.file_name()))
}

/// Per-event handle on the shared log file. A failed clone degrades to
/// stderr for that event instead of dropping it.
struct LogFile(File);

enum LogSink {
    File(File),
    Stderr,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0.try_clone().map(LogSink::File).unwrap_or(LogSink::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber for `role` and returns the log file path.
/// Errors (unwritable state dir, subscriber already set) are returned so the
/// caller can fall back to [`init_logging_stderr`].
pub fn init_logging(role: LogRole) -> Result<PathBuf> {
    let path = log_path(role)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    let writer = match role {
        LogRole::Worker => BoxMakeWriter::new(LogFile(file).and(io::stderr)),
        LogRole::Client => BoxMakeWriter::new(LogFile(file)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!(role = ?role, "logging to {}", path.display());
    Ok(path)
}

/// Stderr-only logging when no log file can be opened.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_log_to_separate_files() {
        assert_ne!(LogRole::Worker.file_name(), LogRole::Client.file_name());
    }

    #[test]
    fn log_path_is_under_chunkzip_state_dir() {
        let Ok(path) = log_path(LogRole::Worker) else {
            return;
        };
        assert!(path.ends_with("chunkzip/worker.log"));
    }
}
