//! Folder types and repository.
//!
//! Folders form a forest per room via `parent_id`; `parent_id = NULL` marks
//! a root child of the room. Sibling names are unique within each
//! (parent, room) scope.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::hierarchy::HierarchyEngine;
use crate::naming::{resolve_unique_name, sanitize, validate_name, NameKind};
use crate::{DataRoomError, Result};

/// A folder in a room's hierarchy.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID (UUID string).
    pub id: String,
    /// Folder name, unique among its siblings.
    pub name: String,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<String>,
    /// Room this folder belongs to.
    pub room_id: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<String>,
    /// Room the folder belongs to.
    pub room_id: String,
}

impl NewFolder {
    /// Create a new NewFolder at the room root.
    pub fn new(name: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
            room_id: room_id.into(),
        }
    }

    /// Set the parent folder.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    ///
    /// The name is sanitized, validated and resolved against the sibling
    /// scope before the insert. The room must exist; a parent, when given,
    /// must exist and belong to the same room.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let name = sanitize(&folder.name);
        validate_name(&name, NameKind::Folder)?;

        let room_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = ?)")
            .bind(&folder.room_id)
            .fetch_one(self.pool)
            .await?;
        if !room_exists {
            return Err(DataRoomError::NotFound("room".to_string()));
        }

        if let Some(ref parent_id) = folder.parent_id {
            let parent = self
                .get_by_id(parent_id)
                .await?
                .ok_or_else(|| DataRoomError::NotFound("parent folder".to_string()))?;
            if parent.room_id != folder.room_id {
                return Err(DataRoomError::InvalidParent(
                    "parent folder belongs to a different room".to_string(),
                ));
            }
        }

        let existing = self
            .sibling_names(folder.parent_id.as_deref(), &folder.room_id, None)
            .await?;
        let name = resolve_unique_name(&name, &existing);

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO folders (id, name, parent_id, room_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&name)
        .bind(folder.parent_id.as_deref())
        .bind(&folder.room_id)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        debug!(folder_id = %id, name = %name, room_id = %folder.room_id, "created folder");
        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("folder".to_string()))
    }

    /// Rename a folder, refreshing its updated_at timestamp.
    pub async fn rename(&self, id: &str, new_name: &str) -> Result<Folder> {
        let folder = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("folder".to_string()))?;

        let name = sanitize(new_name);
        validate_name(&name, NameKind::Folder)?;

        let existing = self
            .sibling_names(folder.parent_id.as_deref(), &folder.room_id, Some(id))
            .await?;
        let name = resolve_unique_name(&name, &existing);

        sqlx::query("UPDATE folders SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("folder".to_string()))
    }

    /// Delete a folder together with all descendant folders and every file
    /// contained in that subtree.
    pub async fn delete(&self, id: &str) -> Result<()> {
        HierarchyEngine::new(self.pool)
            .cascade_delete_folder(id)
            .await
    }

    /// Get a folder by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, name, parent_id, room_id, created_at, updated_at
             FROM folders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(folder)
    }

    /// List every folder in a room.
    pub async fn list_by_room(&self, room_id: &str) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, parent_id, room_id, created_at, updated_at
             FROM folders WHERE room_id = ? ORDER BY created_at, id",
        )
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(folders)
    }

    /// List the immediate child folders of a parent (None = room root).
    pub async fn list_by_parent(
        &self,
        parent_id: Option<&str>,
        room_id: &str,
    ) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, parent_id, room_id, created_at, updated_at
             FROM folders WHERE parent_id IS ? AND room_id = ? ORDER BY created_at, id",
        )
        .bind(parent_id)
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(folders)
    }

    /// Sibling folder names in a (parent, room) scope, optionally excluding
    /// one folder (for rename).
    async fn sibling_names(
        &self,
        parent_id: Option<&str>,
        room_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<HashSet<String>> {
        let names: Vec<String> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT name FROM folders WHERE parent_id IS ? AND room_id = ? AND id != ?",
                )
                .bind(parent_id)
                .bind(room_id)
                .bind(id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT name FROM folders WHERE parent_id IS ? AND room_id = ?",
                )
                .bind(parent_id)
                .bind(room_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(names.into_iter().collect())
    }
}
