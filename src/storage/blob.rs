//! Key-value blob storage.
//!
//! The session store serializes its whole state into one string and hands it
//! to a [`BlobStore`]. Writes replace the value for a key in one statement, so
//! an autosave and an explicit save can never interleave into a torn blob.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::FocusError;

/// A durable string-keyed blob medium.
pub trait BlobStore: Send {
    /// Read the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, FocusError>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), FocusError>;

    /// Erase the blob stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), FocusError>;
}

/// Blob store backed by the `blobs` table.
#[derive(Debug)]
pub struct SqliteBlobStore {
    db: Database,
}

impl SqliteBlobStore {
    /// Wrap an open database.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, FocusError> {
        self.db
            .connection()
            .query_row("SELECT value FROM blobs WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| FocusError::Storage(format!("Failed to read blob {key}: {e}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), FocusError> {
        self.db
            .connection()
            .execute(
                r"INSERT INTO blobs (key, value, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                 updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| FocusError::Storage(format!("Failed to write blob {key}: {e}")))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), FocusError> {
        self.db
            .connection()
            .execute("DELETE FROM blobs WHERE key = ?1", [key])
            .map_err(|e| FocusError::Storage(format!("Failed to delete blob {key}: {e}")))?;
        Ok(())
    }
}

/// In-memory blob store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_map<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, FocusError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| FocusError::Storage("memory store lock poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, FocusError> {
        self.with_map(|map| map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), FocusError> {
        self.with_map(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), FocusError> {
        self.with_map(|map| {
            map.remove(key);
        })
    }
}
