//! Room types and repository.
//!
//! A room is a top-level isolated namespace owning one folder/file universe.
//! Room names are unique globally; collisions are resolved against the set
//! of all existing room names.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::naming::{resolve_unique_name, sanitize, validate_name, NameKind};
use crate::{DataRoomError, Result};

/// A data room.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Room {
    /// Unique room ID (UUID string).
    pub id: String,
    /// Room name, unique across all rooms.
    pub name: String,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// When the room was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Repository for room operations.
pub struct RoomRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RoomRepository<'a> {
    /// Create a new RoomRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new room.
    ///
    /// The name is sanitized, validated and resolved against all existing
    /// room names before anything is written.
    pub async fn create(&self, name: &str) -> Result<Room> {
        let name = sanitize(name);
        validate_name(&name, NameKind::Room)?;

        let existing = self.name_scope(None).await?;
        let name = resolve_unique_name(&name, &existing);

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query("INSERT INTO rooms (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&name)
            .bind(now)
            .bind(now)
            .execute(self.pool)
            .await?;

        debug!(room_id = %id, name = %name, "created room");
        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("room".to_string()))
    }

    /// Rename a room, refreshing its updated_at timestamp.
    ///
    /// The room's own current name is excluded from the uniqueness scope so
    /// renaming to the same name is a no-op rather than a collision.
    pub async fn rename(&self, id: &str, new_name: &str) -> Result<Room> {
        let room = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("room".to_string()))?;

        let name = sanitize(new_name);
        validate_name(&name, NameKind::Room)?;

        let existing = self.name_scope(Some(&room.id)).await?;
        let name = resolve_unique_name(&name, &existing);

        sqlx::query("UPDATE rooms SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("room".to_string()))
    }

    /// Delete a room together with every folder and file scoped to it.
    ///
    /// Runs as one transaction so a failure partway through leaves the room
    /// and its contents intact.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let room = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("room".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let files = sqlx::query("DELETE FROM files WHERE room_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let folders = sqlx::query("DELETE FROM folders WHERE room_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            room_id = %id,
            name = %room.name,
            folders,
            files,
            "deleted room with contents"
        );
        Ok(())
    }

    /// Get a room by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(
            "SELECT id, name, created_at, updated_at FROM rooms WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(room)
    }

    /// List all rooms, oldest first.
    pub async fn list(&self) -> Result<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            "SELECT id, name, created_at, updated_at FROM rooms ORDER BY created_at, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rooms)
    }

    /// All room names, optionally excluding one room (for rename).
    async fn name_scope(&self, exclude_id: Option<&str>) -> Result<HashSet<String>> {
        let names: Vec<String> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar("SELECT name FROM rooms WHERE id != ?")
                    .bind(id)
                    .fetch_all(self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT name FROM rooms")
                    .fetch_all(self.pool)
                    .await?
            }
        };

        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_room() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let room = repo.create("Acme Deal").await.unwrap();

        assert_eq!(room.name, "Acme Deal");
        assert!(!room.id.is_empty());
        assert_eq!(room.created_at, room.updated_at);
    }

    #[tokio::test]
    async fn test_create_room_sanitizes_name() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let room = repo.create("  Acme/Deal?  ").await.unwrap();
        assert_eq!(room.name, "AcmeDeal");
    }

    #[tokio::test]
    async fn test_create_room_rejects_blank_name() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let err = repo.create("  <*>  ").await.unwrap_err();
        assert!(matches!(err, DataRoomError::Validation(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_room_resolves_name_collision() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        repo.create("Deal").await.unwrap();
        let second = repo.create("Deal").await.unwrap();

        assert_eq!(second.name, "Deal (1)");
    }

    #[tokio::test]
    async fn test_rename_room() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let room = repo.create("Old").await.unwrap();
        let renamed = repo.rename(&room.id, "New").await.unwrap();

        assert_eq!(renamed.name, "New");
        assert!(renamed.updated_at >= room.updated_at);
        assert_eq!(renamed.created_at, room.created_at);
    }

    #[tokio::test]
    async fn test_rename_room_to_own_name_is_noop() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let room = repo.create("Same").await.unwrap();
        let renamed = repo.rename(&room.id, "Same").await.unwrap();
        assert_eq!(renamed.name, "Same");
    }

    #[tokio::test]
    async fn test_rename_room_not_found() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let err = repo.rename("missing", "Name").await.unwrap_err();
        assert!(matches!(err, DataRoomError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_room_not_found() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let err = repo.delete("missing").await.unwrap_err();
        assert!(matches!(err, DataRoomError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_rooms_ordered_by_creation() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        repo.create("First").await.unwrap();
        repo.create("Second").await.unwrap();

        let rooms = repo.list().await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].name, "First");
        assert_eq!(rooms[1].name, "Second");
    }
}
