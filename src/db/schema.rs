//! Database schema and migrations for the dataroom store.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - rooms, folders, files, metadata
    r#"
-- Rooms: top-level isolated namespaces, each owning one folder/file universe
CREATE TABLE rooms (
    id          TEXT PRIMARY KEY,        -- UUID
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,           -- RFC 3339
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_rooms_created_at ON rooms(created_at);

-- Folders: a forest per room via parent_id (NULL = root child of the room).
-- Tree-edge constraints are deferred so a cascade can remove a whole subtree
-- inside one transaction regardless of deletion order.
CREATE TABLE folders (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    parent_id   TEXT REFERENCES folders(id) DEFERRABLE INITIALLY DEFERRED,
    room_id     TEXT NOT NULL REFERENCES rooms(id) DEFERRABLE INITIALLY DEFERRED,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_folders_parent_id ON folders(parent_id);
CREATE INDEX idx_folders_room_id ON folders(room_id);

-- Sibling-name uniqueness. SQLite treats NULLs as distinct in UNIQUE
-- indexes, so the room-root scope needs its own partial index.
CREATE UNIQUE INDEX idx_folders_root_name
    ON folders(room_id, name) WHERE parent_id IS NULL;
CREATE UNIQUE INDEX idx_folders_sibling_name
    ON folders(room_id, parent_id, name) WHERE parent_id IS NOT NULL;

-- Files: named leaf entities holding byte content (folder_id NULL = room root)
CREATE TABLE files (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    folder_id   TEXT REFERENCES folders(id) DEFERRABLE INITIALLY DEFERRED,
    room_id     TEXT NOT NULL REFERENCES rooms(id) DEFERRABLE INITIALLY DEFERRED,
    mime_type   TEXT NOT NULL DEFAULT '',
    size        INTEGER NOT NULL DEFAULT 0,
    content     BLOB NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_files_folder_id ON files(folder_id);
CREATE INDEX idx_files_room_id ON files(room_id);

CREATE UNIQUE INDEX idx_files_root_name
    ON files(room_id, name) WHERE folder_id IS NULL;
CREATE UNIQUE INDEX idx_files_sibling_name
    ON files(room_id, folder_id, name) WHERE folder_id IS NOT NULL;

-- Small key/value side table (seed flags and similar client state)
CREATE TABLE metadata (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);
"#,
];
