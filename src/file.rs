//! File types and repository.
//!
//! A file is a named leaf entity holding byte content, attached to a folder
//! or to the room root (`folder_id = NULL`). Content and size are fixed at
//! creation; only the name can change afterwards.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::naming::{resolve_unique_name, sanitize, validate_name, NameKind};
use crate::{DataRoomError, Result};

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document", // .docx
    "application/vnd.ms-excel",                                                // .xls
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",       // .xlsx
    "text/plain",                                                              // .txt
    "text/csv",                                                                // .csv
    "application/csv",                                                         // .csv alternative
];

/// Extensions accepted when the declared MIME type is missing or unknown.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".xls", ".xlsx", ".txt", ".csv"];

/// Stored file metadata. Content is fetched separately via
/// [`FileRepository::get_content`].
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID (UUID string).
    pub id: String,
    /// File name, unique among its siblings.
    pub name: String,
    /// Containing folder ID (None for room root).
    pub folder_id: Option<String>,
    /// Room this file belongs to.
    pub room_id: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Content length in bytes, fixed at creation.
    pub size: i64,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new file.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// File name.
    pub name: String,
    /// Containing folder ID (None for room root).
    pub folder_id: Option<String>,
    /// Room the file belongs to.
    pub room_id: String,
    /// Declared MIME type (may be empty; the extension is checked instead).
    pub mime_type: String,
    /// File content.
    pub content: Vec<u8>,
}

impl NewFile {
    /// Create a new NewFile at the room root.
    pub fn new(
        name: impl Into<String>,
        room_id: impl Into<String>,
        mime_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            folder_id: None,
            room_id: room_id.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Set the containing folder.
    pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }
}

/// Check that a file is one of the accepted document formats.
///
/// The declared MIME type is checked against the allow-list first; when it
/// is missing or unrecognized, the extension (and the type mime_guess infers
/// from it) decides.
pub fn validate_file_type(name: &str, mime_type: &str) -> Result<()> {
    if !mime_type.is_empty() && ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Ok(());
    }

    let lower = name.to_lowercase();
    if ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Ok(());
    }

    if let Some(guessed) = mime_guess::from_path(&lower).first_raw() {
        if ALLOWED_MIME_TYPES.contains(&guessed) {
            return Ok(());
        }
    }

    Err(DataRoomError::InvalidFile(
        "only PDF, Word (.docx), Excel (.xls, .xlsx), TXT, and CSV files are allowed".to_string(),
    ))
}

/// Check a file's size against the given limit.
pub fn validate_file_size(size: u64, max_size: u64) -> Result<()> {
    if size > max_size {
        let max_mb = max_size / 1024 / 1024;
        return Err(DataRoomError::InvalidFile(format!(
            "file size exceeds {max_mb}MB limit"
        )));
    }
    Ok(())
}

/// Repository for file operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
    max_file_size: u64,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create a new FileRepository with a custom max upload size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Create a new file.
    ///
    /// Validates type, size and name before anything is written. The size
    /// column is set to the content length. The room must exist; a folder,
    /// when given, must exist and belong to the same room.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        validate_file_type(&file.name, &file.mime_type)?;
        validate_file_size(file.content.len() as u64, self.max_file_size)?;

        let name = sanitize(&file.name);
        validate_name(&name, NameKind::File)?;

        let room_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = ?)")
            .bind(&file.room_id)
            .fetch_one(self.pool)
            .await?;
        if !room_exists {
            return Err(DataRoomError::NotFound("room".to_string()));
        }

        if let Some(ref folder_id) = file.folder_id {
            let folder_room: Option<String> =
                sqlx::query_scalar("SELECT room_id FROM folders WHERE id = ?")
                    .bind(folder_id)
                    .fetch_optional(self.pool)
                    .await?;
            match folder_room {
                None => return Err(DataRoomError::NotFound("folder".to_string())),
                Some(room) if room != file.room_id => {
                    return Err(DataRoomError::InvalidParent(
                        "folder belongs to a different room".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }

        let existing = self
            .sibling_names(file.folder_id.as_deref(), &file.room_id, None)
            .await?;
        let name = resolve_unique_name(&name, &existing);

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO files (id, name, folder_id, room_id, mime_type, size, content, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&name)
        .bind(file.folder_id.as_deref())
        .bind(&file.room_id)
        .bind(&file.mime_type)
        .bind(file.content.len() as i64)
        .bind(&file.content)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        debug!(file_id = %id, name = %name, size = file.content.len(), "created file");
        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("file".to_string()))
    }

    /// Rename a file, refreshing its updated_at timestamp. Content and size
    /// are untouched.
    pub async fn rename(&self, id: &str, new_name: &str) -> Result<FileRecord> {
        let file = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("file".to_string()))?;

        let name = sanitize(new_name);
        validate_name(&name, NameKind::File)?;

        let existing = self
            .sibling_names(file.folder_id.as_deref(), &file.room_id, Some(id))
            .await?;
        let name = resolve_unique_name(&name, &existing);

        sqlx::query("UPDATE files SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DataRoomError::NotFound("file".to_string()))
    }

    /// Delete a file by ID.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataRoomError::NotFound("file".to_string()));
        }
        Ok(())
    }

    /// Get file metadata by ID (without content).
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(
            "SELECT id, name, folder_id, room_id, mime_type, size, created_at, updated_at
             FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// Get a file's content by ID.
    pub async fn get_content(&self, id: &str) -> Result<Vec<u8>> {
        let content: Option<Vec<u8>> = sqlx::query_scalar("SELECT content FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        content.ok_or_else(|| DataRoomError::NotFound("file".to_string()))
    }

    /// List every file in a room (metadata only).
    pub async fn list_by_room(&self, room_id: &str) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<_, FileRecord>(
            "SELECT id, name, folder_id, room_id, mime_type, size, created_at, updated_at
             FROM files WHERE room_id = ? ORDER BY created_at, id",
        )
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(files)
    }

    /// List the files directly inside a folder (None = room root).
    pub async fn list_by_folder(
        &self,
        folder_id: Option<&str>,
        room_id: &str,
    ) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<_, FileRecord>(
            "SELECT id, name, folder_id, room_id, mime_type, size, created_at, updated_at
             FROM files WHERE folder_id IS ? AND room_id = ? ORDER BY created_at, id",
        )
        .bind(folder_id)
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(files)
    }

    /// Sibling file names in a (folder, room) scope, optionally excluding
    /// one file (for rename).
    async fn sibling_names(
        &self,
        folder_id: Option<&str>,
        room_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<HashSet<String>> {
        let names: Vec<String> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT name FROM files WHERE folder_id IS ? AND room_id = ? AND id != ?",
                )
                .bind(folder_id)
                .bind(room_id)
                .bind(id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT name FROM files WHERE folder_id IS ? AND room_id = ?")
                    .bind(folder_id)
                    .bind(room_id)
                    .fetch_all(self.pool)
                    .await?
            }
        };

        Ok(names.into_iter().collect())
    }
}
