use std::path::PathBuf;

use thiserror::Error;

use crate::state::ProvisioningState;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid provisioning state transition from {from} to {to}")]
    InvalidTransition {
        from: ProvisioningState,
        to: ProvisioningState,
    },

    #[error("provisioning is {state}; refusing to proceed")]
    Conflict { state: ProvisioningState },

    #[error("failed to read lifecycle state file '{path}'")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write lifecycle state file '{path}'")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lifecycle state file '{path}'")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize lifecycle state for '{path}'")]
    StoreSerialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("lifecycle store lock poisoned")]
    Poisoned,
}

impl LifecycleError {
    /// Whether this error means another run is in progress.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
