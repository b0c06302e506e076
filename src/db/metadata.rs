//! Key/value metadata repository.
//!
//! A small side table for client state that is not an entity of its own,
//! such as the seed-data flag.

use sqlx::SqlitePool;

use crate::Result;

/// Repository for metadata key/value operations.
pub struct MetadataRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MetadataRepository<'a> {
    /// Create a new MetadataRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a metadata value by key.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        Ok(value)
    }

    /// Set a metadata value, overwriting any previous value for the key.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO metadata (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a metadata key. Returns true when a row was deleted.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM metadata WHERE key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
