//! Error types for focusbubble.

use thiserror::Error;

/// Errors that can occur while tracking focus sessions.
#[derive(Debug, Error)]
pub enum FocusError {
    /// `SQLite` failure.
    #[error("database error: {0}")]
    Database(String),

    /// Configuration could not be loaded or saved.
    #[error("config error: {0}")]
    Config(String),

    /// The key-value blob store rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested item does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation is not valid in the current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for FocusError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<rusqlite::Error> for FocusError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
