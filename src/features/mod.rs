//! Feature implementations for focusbubble.

pub mod focus;
