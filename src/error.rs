//! Error types for mediatree.

use thiserror::Error;

/// Common error type for mediatree operations.
///
/// Structural failures are modeled here; per-item failures inside a batch
/// move or purge are reported as data (see `MoveReport` / `PurgeReport`)
/// so that sibling items keep making progress.
#[derive(Error, Debug)]
pub enum MediaTreeError {
    /// A move intent rejected by the guard before any mutation.
    #[error("invalid move intent: {0}")]
    InvalidIntent(String),

    /// No resource kind could confirm the object's existence.
    #[error("object not found under any resource kind: {0}")]
    ObjectNotFound(String),

    /// A destination path is already occupied by an unrelated live entry.
    #[error("rename collision at {0}")]
    RenameCollision(String),

    /// Validation error for paths or other user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Folder registry (database) error.
    #[error("registry error: {0}")]
    Database(String),

    /// Remote object store error.
    #[error("object store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for MediaTreeError {
    fn from(e: sqlx::Error) -> Self {
        MediaTreeError::Database(e.to_string())
    }
}

/// Result type alias for mediatree operations.
pub type Result<T> = std::result::Result<T, MediaTreeError>;
