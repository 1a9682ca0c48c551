//! CLI error types.

use wk_config::ConfigError;
use wk_core::WikiError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Wiki(#[from] WikiError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}

impl From<wk_store::StorageError> for CliError {
    fn from(e: wk_store::StorageError) -> Self {
        Self::Wiki(WikiError::StorageUnavailable(e))
    }
}
