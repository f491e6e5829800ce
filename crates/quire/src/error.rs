//! CLI error types.

use quire_config::ConfigError;
use quire_site::LibraryError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Library(#[from] LibraryError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Watch(String),
}
