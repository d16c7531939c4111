/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("record {id} not found")]
    RecordNotFound { id: i64 },

    #[error("cluster {id} not found")]
    ClusterNotFound { id: i64 },

    #[error("integrity violation: {details}")]
    Integrity { details: String },

    #[error("embedding has {got} dimensions, store requires {want}")]
    DimensionMismatch { got: usize, want: usize },
}
