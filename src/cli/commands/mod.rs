//! Command implementations for focusbubble.

mod focus;
mod run;

pub use focus::{clear, export, history, open_tracker, show, stats, write_export};
pub use run::{run, ReplCommand};
