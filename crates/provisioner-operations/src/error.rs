use std::path::PathBuf;

use provisioner_fault::{DivergenceError, FaultError};
use provisioner_lifecycle::LifecycleError;
use provisioner_saga::RollbackError;
use thiserror::Error;

/// Details about a failed compensation during rollback.
#[derive(Debug)]
pub struct CompensationFailure {
    /// Name of the compensation that failed.
    pub compensation: String,
    /// The error that occurred during compensation.
    pub error: Box<OperationError>,
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Fault(#[from] FaultError),

    #[error("{system} rejected the update: {reason}")]
    RemoteRejected {
        system: &'static str,
        reason: String,
    },

    #[error("failed to write outbox payload '{path}'")]
    OutboxWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize payload for {system}")]
    PayloadSerialize {
        system: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read definition store '{path}'")]
    DefinitionStoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write definition store '{path}'")]
    DefinitionStoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse definition store '{path}'")]
    DefinitionStoreParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read work file '{path}'")]
    WorkFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse work file '{path}'")]
    WorkFileParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("definition store lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Divergence(#[from] DivergenceError<Box<OperationError>>),

    #[error("provisioning failed and was rolled back")]
    ProvisioningFailed {
        #[source]
        source: Box<OperationError>,
    },

    #[error(
        "provisioning failed and {} compensation(s) also failed", failures.len()
    )]
    RollbackFailed {
        source: Box<OperationError>,
        failures: Vec<CompensationFailure>,
    },
}

pub type Result<T> = std::result::Result<T, OperationError>;

impl OperationError {
    /// Whether the operation was refused because a run is in progress.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Lifecycle(e) if e.is_conflict())
    }

    /// Whether a remote system changed while the local record did not.
    #[must_use]
    pub fn is_divergence(&self) -> bool {
        match self {
            Self::Divergence(_) => true,
            Self::ProvisioningFailed { source } | Self::RollbackFailed { source, .. } => {
                source.is_divergence()
            }
            _ => false,
        }
    }

    /// Attach the outcome of a rollback to the error that triggered it.
    #[must_use]
    pub fn rolled_back(self, rollback: std::result::Result<(), RollbackError<Self>>) -> Self {
        match rollback {
            Ok(()) => Self::ProvisioningFailed {
                source: Box::new(self),
            },
            Err(rollback) => Self::RollbackFailed {
                source: Box::new(self),
                failures: rollback
                    .failures
                    .into_iter()
                    .map(|f| CompensationFailure {
                        compensation: f.compensation,
                        error: Box::new(f.error),
                    })
                    .collect(),
            },
        }
    }
}
