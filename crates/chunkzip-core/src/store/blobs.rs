//! Keyed put/get/delete.

use sqlx::Row;

use super::db::{unix_timestamp, ChunkStore};

/// Metadata stored alongside a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobMetadata {
    pub content_type: Option<String>,
}

impl BlobMetadata {
    pub fn json() -> Self {
        Self {
            content_type: Some("application/json".to_string()),
        }
    }
}

/// A value read back from the store.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub key: String,
    pub value: Vec<u8>,
    pub metadata: BlobMetadata,
    pub updated_at: i64,
}

impl ChunkStore {
    /// Write `value` at `key`, replacing any previous value in one statement.
    pub async fn put(
        &self,
        key: &str,
        value: &[u8],
        metadata: &BlobMetadata,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO blobs (key, value, content_type, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                content_type = excluded.content_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(metadata.content_type.as_deref())
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Read the value at `key`, or `None` if absent.
    pub async fn get(&self, key: &str) -> Result<Option<StoredBlob>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT key, value, content_type, updated_at
            FROM blobs
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StoredBlob {
            key: row.get("key"),
            value: row.get("value"),
            metadata: BlobMetadata {
                content_type: row.get("content_type"),
            },
            updated_at: row.get("updated_at"),
        }))
    }

    /// Delete `key`. Returns true if a row was removed.
    pub async fn delete(&self, key: &str) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM blobs WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Delete every key in one transaction: either all go or none do.
    pub async fn delete_many(&self, keys: &[String]) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0u64;
        for key in keys {
            removed += sqlx::query("DELETE FROM blobs WHERE key = ?1")
                .bind(key)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(removed)
    }

    /// Keys under `prefix`, sorted. Used to inspect leftovers of a package.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT key FROM blobs
            WHERE substr(key, 1, length(?1)) = ?1
            ORDER BY key ASC
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.get("key")).collect())
    }
}
