//! Configuration management for focusbubble.
//!
//! This module handles loading configuration from `~/.focusbubble/`.

mod paths;
mod settings;

pub use paths::{Paths, HOME_ENV};
pub use settings::{ColorSetting, Config, FocusConfig, GeneralConfig};
