//! CLI error types.

use hbt_atompub::AtomPubError;
use hbt_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    AtomPub(#[from] AtomPubError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0} entries failed to update")]
    EntriesFailed(usize),
}
