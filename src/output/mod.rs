//! Output formatting for focusbubble.
//!
//! This module provides formatters for displaying sessions and statistics in
//! various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::FocusError;
use crate::features::focus::{AggregateStatistics, Session};

pub use json::*;
pub use pretty::*;

/// Format statistics based on output format
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_statistics(
    stats: &AggregateStatistics,
    format: OutputFormat,
) -> Result<String, FocusError> {
    match format {
        OutputFormat::Pretty => Ok(format_statistics_pretty(stats)),
        OutputFormat::Json => format_statistics_json(stats),
    }
}

/// Format a session list based on output format
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_sessions(sessions: &[Session], format: OutputFormat) -> Result<String, FocusError> {
    match format {
        OutputFormat::Pretty => Ok(format_sessions_pretty(sessions)),
        OutputFormat::Json => format_sessions_json(sessions),
    }
}

/// Format a single session based on output format
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_session(session: &Session, format: OutputFormat) -> Result<String, FocusError> {
    match format {
        OutputFormat::Pretty => Ok(format_session_pretty(session)),
        OutputFormat::Json => to_json(session),
    }
}
