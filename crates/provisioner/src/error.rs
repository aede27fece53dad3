use std::path::PathBuf;

use provisioner_fault::FaultError;
use provisioner_operations::OperationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to determine current directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to start async runtime")]
    Runtime(#[source] std::io::Error),

    #[error("fault reporting unavailable")]
    Fault(#[from] FaultError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Whether the command was refused because a run is in progress.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Operation(e) if e.is_conflict())
    }
}
