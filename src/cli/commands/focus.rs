//! One-shot focus commands.
//!
//! Each command opens the tracker over the on-disk store, reads or mutates it,
//! and returns the text to print.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use serde_json::json;

use crate::cli::args::OutputFormat;
use crate::config::{FocusConfig, Paths};
use crate::core::SystemClock;
use crate::error::FocusError;
use crate::features::focus::FocusTracker;
use crate::output::{format_session, format_sessions, format_statistics, to_json};
use crate::storage::{Database, SqliteBlobStore};

/// Open the tracker over the `SQLite` blob store under `paths`.
///
/// # Errors
///
/// Returns an error if the data directory or database cannot be opened.
pub fn open_tracker(paths: &Paths, config: &FocusConfig) -> Result<FocusTracker, FocusError> {
    paths.ensure_dirs()?;
    let db = Database::open(paths)?;
    Ok(FocusTracker::new(
        Arc::new(SystemClock),
        Box::new(SqliteBlobStore::new(db)),
        config.clone(),
    ))
}

/// Show aggregate statistics.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn stats(tracker: &FocusTracker, format: OutputFormat) -> Result<String, FocusError> {
    format_statistics(&tracker.store().statistics(), format)
}

/// List completed sessions, most recent first.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn history(
    tracker: &FocusTracker,
    limit: usize,
    format: OutputFormat,
) -> Result<String, FocusError> {
    let sessions: Vec<_> = tracker
        .store()
        .sessions()
        .into_iter()
        .rev()
        .take(limit)
        .collect();
    format_sessions(&sessions, format)
}

/// Show one completed session.
///
/// # Errors
///
/// Returns `FocusError::NotFound` if no session has this id.
pub fn show(tracker: &FocusTracker, id: &str, format: OutputFormat) -> Result<String, FocusError> {
    let session = tracker.store().find_session(id)?;
    format_session(&session, format)
}

/// Print or write the export document.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn export(
    tracker: &FocusTracker,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<String, FocusError> {
    let report = tracker.store().export_snapshot();
    let document = to_json(&report)?;

    let Some(path) = file else {
        return Ok(document);
    };

    write_export(path, &document)?;

    match format {
        OutputFormat::Json => to_json(&json!({
            "file": path.display().to_string(),
            "sessions": report.sessions.len(),
        })),
        OutputFormat::Pretty => Ok(format!(
            "{} {} session{} to {}",
            "Exported".green(),
            report.sessions.len(),
            if report.sessions.len() == 1 { "" } else { "s" },
            path.display()
        )),
    }
}

/// Write an export document to disk.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_export(path: &Path, document: &str) -> Result<(), FocusError> {
    std::fs::write(path, document).map_err(|e| {
        FocusError::Storage(format!("Failed to write export {}: {e}", path.display()))
    })
}

/// Erase all history.
///
/// # Errors
///
/// Returns `FocusError::InvalidState` without `--force`.
pub fn clear(
    tracker: &mut FocusTracker,
    force: bool,
    format: OutputFormat,
) -> Result<String, FocusError> {
    if !force {
        return Err(FocusError::InvalidState(
            "This will delete all focus session history.\nUse --force to confirm.".to_string(),
        ));
    }

    tracker.clear_all_data();

    match format {
        OutputFormat::Json => to_json(&json!({ "cleared": true })),
        OutputFormat::Pretty => Ok("Focus session history cleared.".to_string()),
    }
}
