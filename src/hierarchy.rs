//! Hierarchy engine: ancestor paths, path rendering, cascade deletion and
//! direct-children aggregation.
//!
//! All traversal works by repeated indexed lookup over the flat folder
//! table, never by walking an in-memory object graph.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::folder::Folder;
use crate::{DataRoomError, Result};

/// Hard ceiling on the length of a parent chain. A well-formed forest never
/// comes close; exceeding it means a cycle crept in somewhere.
pub const MAX_PATH_DEPTH: usize = 1000;

/// Number of ids bound per DELETE statement during a cascade.
const DELETE_CHUNK: usize = 400;

/// One step of an ancestor path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathItem {
    /// Folder ID.
    pub id: String,
    /// Folder name.
    pub name: String,
}

/// Direct-children statistics for one directory level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirStats {
    /// Immediate child files.
    pub file_count: i64,
    /// Immediate child folders.
    pub folder_count: i64,
    /// Sum of immediate child file sizes.
    pub total_bytes: i64,
}

/// Render an ancestor path as a display string, e.g. `"Acme / A / B"`.
/// An empty path renders as just the room name.
pub fn format_path(path: &[PathItem], room_name: &str) -> String {
    if path.is_empty() {
        return room_name.to_string();
    }
    let joined = path
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(" / ");
    format!("{room_name} / {joined}")
}

/// Walk an in-memory folder index from `folder_id` up to the root, returning
/// the chain root-first and including the named folder itself.
///
/// Same semantics as [`HierarchyEngine::ancestor_path`] but over a snapshot,
/// so a batch caller (search) can resolve many paths from one read.
pub fn path_from_index(
    index: &HashMap<String, Folder>,
    folder_id: Option<&str>,
) -> Result<Vec<PathItem>> {
    let mut path = Vec::new();
    let mut current = folder_id.map(|s| s.to_string());

    while let Some(id) = current {
        if path.len() >= MAX_PATH_DEPTH {
            return Err(DataRoomError::CycleDetected(format!("folder {id}")));
        }
        match index.get(&id) {
            Some(folder) => {
                path.push(PathItem {
                    id: folder.id.clone(),
                    name: folder.name.clone(),
                });
                current = folder.parent_id.clone();
            }
            // Dangling parent pointer: stop at the last known ancestor.
            None => break,
        }
    }

    path.reverse();
    Ok(path)
}

/// Read-side tree algorithms over the folder/file tables.
pub struct HierarchyEngine<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HierarchyEngine<'a> {
    /// Create a new HierarchyEngine with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// The chain of folders from the root-most ancestor down to and
    /// including `folder_id`. `None` yields an empty chain (room root).
    ///
    /// Bounded by [`MAX_PATH_DEPTH`]; a longer chain fails with
    /// `CycleDetected` instead of looping forever.
    pub async fn ancestor_path(&self, folder_id: Option<&str>) -> Result<Vec<PathItem>> {
        let mut path = Vec::new();
        let mut current = folder_id.map(|s| s.to_string());

        while let Some(id) = current {
            if path.len() >= MAX_PATH_DEPTH {
                return Err(DataRoomError::CycleDetected(format!("folder {id}")));
            }
            let row: Option<(String, String, Option<String>)> =
                sqlx::query_as("SELECT id, name, parent_id FROM folders WHERE id = ?")
                    .bind(&id)
                    .fetch_optional(self.pool)
                    .await?;
            match row {
                Some((id, name, parent_id)) => {
                    path.push(PathItem { id, name });
                    current = parent_id;
                }
                None => break,
            }
        }

        path.reverse();
        Ok(path)
    }

    /// Full display path for an entity: room name, ancestor chain, then the
    /// leaf name when given. `folder_id` is the entity's containing folder.
    pub async fn full_path(
        &self,
        folder_id: Option<&str>,
        leaf: Option<&str>,
        room_name: &str,
    ) -> Result<String> {
        let mut path = self.ancestor_path(folder_id).await?;
        if let Some(leaf) = leaf {
            path.push(PathItem {
                id: String::new(),
                name: leaf.to_string(),
            });
        }
        Ok(format_path(&path, room_name))
    }

    /// Delete a folder, every descendant folder, and every file contained in
    /// that subtree, as one transaction.
    ///
    /// The descendant set is collected breadth-first with an explicit
    /// worklist, so arbitrarily deep nesting cannot overflow the call stack.
    pub async fn cascade_delete_folder(&self, folder_id: &str) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?)")
            .bind(folder_id)
            .fetch_one(self.pool)
            .await?;
        if !exists {
            return Err(DataRoomError::NotFound("folder".to_string()));
        }

        // Worklist traversal: ids[cursor..] are folders whose children have
        // not been expanded yet.
        let mut ids: Vec<String> = vec![folder_id.to_string()];
        let mut cursor = 0;
        while cursor < ids.len() {
            let children: Vec<String> =
                sqlx::query_scalar("SELECT id FROM folders WHERE parent_id = ?")
                    .bind(&ids[cursor])
                    .fetch_all(self.pool)
                    .await?;
            ids.extend(children);
            cursor += 1;
        }

        debug!(folder_id, descendants = ids.len() - 1, "collected cascade set");

        let mut tx = self.pool.begin().await?;
        let mut files_deleted = 0u64;

        for chunk in ids.chunks(DELETE_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM files WHERE folder_id IN (");
            let mut separated = qb.separated(", ");
            for id in chunk {
                separated.push_bind(id);
            }
            qb.push(")");
            files_deleted += qb.build().execute(&mut *tx).await?.rows_affected();
        }

        for chunk in ids.chunks(DELETE_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM folders WHERE id IN (");
            let mut separated = qb.separated(", ");
            for id in chunk {
                separated.push_bind(id);
            }
            qb.push(")");
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        info!(
            folder_id,
            folders = ids.len(),
            files = files_deleted,
            "cascade deleted folder subtree"
        );
        Ok(())
    }

    /// Direct-children statistics for a directory level (None = room root):
    /// immediate child folders, immediate child files, and the sum of
    /// immediate child file sizes. Not recursive.
    pub async fn aggregate(&self, folder_id: Option<&str>, room_id: &str) -> Result<DirStats> {
        let folder_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id IS ? AND room_id = ?")
                .bind(folder_id)
                .bind(room_id)
                .fetch_one(self.pool)
                .await?;

        let (file_count, total_bytes): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(size), 0) FROM files WHERE folder_id IS ? AND room_id = ?",
        )
        .bind(folder_id)
        .bind(room_id)
        .fetch_one(self.pool)
        .await?;

        Ok(DirStats {
            file_count,
            folder_count,
            total_bytes,
        })
    }
}
