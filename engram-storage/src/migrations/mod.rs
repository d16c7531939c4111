//! Schema migrations tracked by `PRAGMA user_version`.

mod v001_memories;
mod v002_fulltext;
mod v003_vectors;

use rusqlite::Connection;

use engram_core::errors::{EngramResult, StorageError};

use crate::to_storage_err;

type Migration = fn(&Connection) -> EngramResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_memories::migrate),
    (2, v002_fulltext::migrate),
    (3, v003_vectors::migrate),
];

/// Apply all pending migrations in order.
pub fn run_migrations(conn: &Connection) -> EngramResult<()> {
    let current: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| to_storage_err(e.to_string()))?;
        tracing::debug!(version, "applied migration");
    }
    Ok(())
}
