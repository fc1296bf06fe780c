//! Connection handling and migrations for the chunk store.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Concurrent phase calls for different chunks write at the same time;
/// writers wait this long for the lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to the SQLite-backed blob store. Cheap to clone (shared pool).
#[derive(Clone)]
pub struct ChunkStore {
    pub(crate) pool: Pool<Sqlite>,
}

impl ChunkStore {
    /// `~/.local/state/chunkzip/chunks.db`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("chunkzip")?;
        Ok(xdg_dirs.get_state_home().join("chunkzip").join("chunks.db"))
    }

    pub async fn open_default() -> Result<Self> {
        Self::open_at(Self::default_path()?).await
    }

    /// Opens (or creates) the store file at `path` in WAL mode.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .with_context(|| format!("open chunk store {}", path.display()))?;

        let store = ChunkStore { pool };
        store.migrate().await?;
        tracing::debug!("chunk store ready at {}", path.display());
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blobs (
                key TEXT PRIMARY KEY NOT NULL,
                value BLOB NOT NULL,
                content_type TEXT,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Single-connection in-memory store; every connection to `:memory:` would
/// otherwise see its own empty database.
#[cfg(test)]
pub(crate) async fn open_memory() -> Result<ChunkStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = ChunkStore { pool };
    store.migrate().await?;
    Ok(store)
}
