//! CLI error types.

use docview_config::ConfigError;
use docview_server::{ServerError, ViewError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    View(#[from] ViewError),

    #[error("{path} answered with status {status}")]
    Status { path: String, status: u16 },
}
