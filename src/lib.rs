//! focusbubble - a focus session tracker
//!
//! This crate times focus sessions, detects and debounces distractions, and
//! keeps a persisted history with statistics and insights. The three
//! components communicate only through a typed notification bus.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bus;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::FocusError;
pub use features::focus::FocusTracker;
