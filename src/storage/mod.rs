//! Storage layer for focusbubble.
//!
//! The tracker persists one JSON blob through the [`BlobStore`] trait.
//! `SQLite` is the durable medium; an in-memory store backs tests and
//! ephemeral runs.

mod blob;
mod database;
mod migrations;

pub use blob::{BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use database::Database;
