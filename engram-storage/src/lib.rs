//! # engram-storage
//!
//! SQLite persistence for the Engram memory system: a single write
//! connection plus a small read pool, `user_version` migrations, an FTS5
//! index kept consistent by triggers, a vector table scanned by brute
//! force, and the cluster table.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
mod time;

pub use engine::StorageEngine;

use engram_core::errors::{EngramError, StorageError};

/// Shorthand used by every query module to wrap rusqlite errors.
pub(crate) fn to_storage_err(message: impl Into<String>) -> EngramError {
    EngramError::Storage(StorageError::Sqlite {
        message: message.into(),
    })
}
