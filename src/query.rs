//! Query engine: name search and listing sort order.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::file::{FileRecord, FileRepository};
use crate::folder::{Folder, FolderRepository};
use crate::hierarchy::{path_from_index, PathItem};
use crate::Result;

/// Kind of entity a search hit refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A folder.
    Folder,
    /// A file.
    File,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Kind of the matched entity.
    pub kind: EntryKind,
    /// Entity ID.
    pub id: String,
    /// Entity name.
    pub name: String,
    /// Ancestor chain for the hit: for a folder, including the folder
    /// itself; for a file, the chain of its containing folder. Render with
    /// [`crate::hierarchy::format_path`].
    pub path: Vec<PathItem>,
}

/// A folder or file in one sortable listing.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A folder entry.
    Folder(Folder),
    /// A file entry.
    File(FileRecord),
}

impl Entry {
    /// The entry's display name.
    pub fn name(&self) -> &str {
        match self {
            Entry::Folder(f) => &f.name,
            Entry::File(f) => &f.name,
        }
    }

    /// When the entry was last modified.
    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Entry::Folder(f) => f.updated_at,
            Entry::File(f) => f.updated_at,
        }
    }

    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Entry::Folder(_))
    }
}

/// Sort key for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Sort by name.
    Name,
    /// Sort by last-modified instant.
    Modified,
}

/// Sort direction. Descending is the exact reverse of ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order.
    Ascending,
    /// Descending order.
    Descending,
}

/// Case-insensitive name ordering with the raw name as tiebreaker, so the
/// comparator is a total order.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort for a directory listing.
///
/// With `folders_first`, folders and files are sorted independently and
/// folders are placed ahead of files; otherwise the two kinds are merged and
/// sorted as one sequence.
pub fn sort_entries(
    entries: Vec<Entry>,
    key: SortKey,
    direction: SortDirection,
    folders_first: bool,
) -> Vec<Entry> {
    let compare = |a: &Entry, b: &Entry| {
        let ordering = match key {
            SortKey::Name => compare_names(a.name(), b.name()),
            SortKey::Modified => a.updated_at().cmp(&b.updated_at()),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    };

    if folders_first {
        let (mut folders, mut files): (Vec<Entry>, Vec<Entry>) =
            entries.into_iter().partition(Entry::is_folder);
        folders.sort_by(compare);
        files.sort_by(compare);
        folders.append(&mut files);
        folders
    } else {
        let mut entries = entries;
        entries.sort_by(compare);
        entries
    }
}

/// Search over every folder and file name in a room.
pub struct SearchEngine<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SearchEngine<'a> {
    /// Create a new SearchEngine with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Case-insensitive substring search over folder and file names scoped
    /// to one room.
    ///
    /// A blank query yields no results. Folder hits rank before file hits;
    /// within each kind, hits are in ascending name order. All ancestor
    /// paths are resolved from a single snapshot read of the room's folders.
    pub async fn search(&self, query: &str, room_id: &str) -> Result<Vec<SearchResult>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let folders = FolderRepository::new(self.pool).list_by_room(room_id).await?;
        let files = FileRepository::new(self.pool).list_by_room(room_id).await?;

        let index: HashMap<String, Folder> = folders
            .iter()
            .cloned()
            .map(|f| (f.id.clone(), f))
            .collect();

        let mut results = Vec::new();

        for folder in &folders {
            if folder.name.to_lowercase().contains(&needle) {
                results.push(SearchResult {
                    kind: EntryKind::Folder,
                    id: folder.id.clone(),
                    name: folder.name.clone(),
                    path: path_from_index(&index, Some(&folder.id))?,
                });
            }
        }

        for file in &files {
            if file.name.to_lowercase().contains(&needle) {
                results.push(SearchResult {
                    kind: EntryKind::File,
                    id: file.id.clone(),
                    name: file.name.clone(),
                    path: path_from_index(&index, file.folder_id.as_deref())?,
                });
            }
        }

        results.sort_by(|a, b| match (a.kind, b.kind) {
            (EntryKind::Folder, EntryKind::File) => Ordering::Less,
            (EntryKind::File, EntryKind::Folder) => Ordering::Greater,
            _ => compare_names(&a.name, &b.name),
        });

        Ok(results)
    }
}
