//! Per-subsystem error enums aggregated into [`EngramError`].

mod config_error;
mod curator_error;
mod gateway_error;
mod retrieval_error;
mod storage_error;

pub use config_error::ConfigError;
pub use curator_error::CuratorError;
pub use gateway_error::GatewayError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;

/// Result alias used across the workspace.
pub type EngramResult<T> = Result<T, EngramError>;

/// Top-level error. Every subsystem error converts into this at public
/// boundaries; the short `Display` form is what tool callers see, the
/// full context goes to the logs.
#[derive(Debug, thiserror::Error)]
pub enum EngramError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Curator(#[from] CuratorError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
