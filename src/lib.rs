//! dataroom - document organizer core.
//!
//! Rooms, folders and files over an embedded transactional SQLite store:
//! entity repositories with naming integrity, recursive cascade deletion,
//! path resolution, and name search with listing sort order. UI concerns
//! (rendering, dialogs, drag-and-drop) live in the consumers of this crate.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod folder;
pub mod hierarchy;
pub mod logging;
pub mod naming;
pub mod query;
pub mod room;

pub use config::Config;
pub use db::{Database, MetadataRepository};
pub use error::{DataRoomError, Result};
pub use file::{
    validate_file_size, validate_file_type, FileRecord, FileRepository, NewFile,
    DEFAULT_MAX_FILE_SIZE,
};
pub use folder::{Folder, FolderRepository, NewFolder};
pub use hierarchy::{format_path, DirStats, HierarchyEngine, PathItem};
pub use naming::{resolve_unique_name, sanitize, validate_name, NameError, NameKind};
pub use query::{Entry, EntryKind, SearchEngine, SearchResult, SortDirection, SortKey};
pub use room::{Room, RoomRepository};
