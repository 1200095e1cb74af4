//! Path resolution for focusbubble configuration and data files.
//!
//! All data is stored in `~/.focusbubble/` unless overridden:
//! - `config.yaml` - Policy constants and output preferences
//! - `focusbubble.db` - `SQLite` database holding the persisted state blob

use std::path::PathBuf;

use crate::error::FocusError;

/// Environment variable that overrides the root directory.
pub const HOME_ENV: &str = "FOCUSBUBBLE_HOME";

/// Paths to focusbubble configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.focusbubble/`
    pub root: PathBuf,
    /// Config file: `~/.focusbubble/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.focusbubble/focusbubble.db`
    pub database: PathBuf,
}

impl Paths {
    /// Create paths based on `FOCUSBUBBLE_HOME` or the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set.
    pub fn new() -> Result<Self, FocusError> {
        if let Ok(custom) = std::env::var(HOME_ENV) {
            return Ok(Self::with_root(PathBuf::from(custom)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            FocusError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".focusbubble")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("focusbubble.db"),
            root,
        }
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), FocusError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                FocusError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }
        Ok(())
    }
}
