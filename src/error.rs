//! Error types for the dataroom core.

use thiserror::Error;

use crate::naming::NameError;

/// Common error type for dataroom operations.
#[derive(Error, Debug)]
pub enum DataRoomError {
    /// Database error.
    ///
    /// Wraps errors surfaced by the embedded store. Errors from sqlx are
    /// automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Name validation error. Raised before any store write is attempted.
    #[error("validation error: {0}")]
    Validation(#[from] NameError),

    /// Rejected file upload (disallowed type or size over the limit).
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// The requested parent does not form a valid attachment point
    /// (e.g. a parent folder belonging to a different room).
    #[error("invalid parent: {0}")]
    InvalidParent(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The folder parent chain exceeded the traversal ceiling.
    ///
    /// This indicates the acyclic-forest invariant was broken and is treated
    /// as a fatal integrity violation, never silently swallowed.
    #[error("cycle detected: {0}")]
    CycleDetected(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for DataRoomError {
    fn from(e: sqlx::Error) -> Self {
        DataRoomError::Database(e.to_string())
    }
}

/// Result type alias for dataroom operations.
pub type Result<T> = std::result::Result<T, DataRoomError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{NameError, NameKind};

    #[test]
    fn test_validation_error_display() {
        let err: DataRoomError = NameError::Empty(NameKind::Folder).into();
        assert_eq!(
            err.to_string(),
            "validation error: folder name cannot be empty"
        );
    }

    #[test]
    fn test_not_found_error_display() {
        let err = DataRoomError::NotFound("folder".to_string());
        assert_eq!(err.to_string(), "folder not found");
    }

    #[test]
    fn test_cycle_detected_display() {
        let err = DataRoomError::CycleDetected("folder abc".to_string());
        assert_eq!(err.to_string(), "cycle detected: folder abc");
    }

    #[test]
    fn test_invalid_file_display() {
        let err = DataRoomError::InvalidFile("file too large".to_string());
        assert_eq!(err.to_string(), "invalid file: file too large");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DataRoomError = io_err.into();
        assert!(matches!(err, DataRoomError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(DataRoomError::NotFound("room".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
