use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::ProvisioningState;

/// A persisted lifecycle transition.
///
/// Records are append-only; ordering between records is by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_end_time: Option<DateTime<Utc>>,
    pub state: ProvisioningState,
    /// Error message of the failure that ended the run, for `ERROR` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl LifecycleRecord {
    /// The synthetic record reported before anything was persisted.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            id: 0,
            provisioning_start_time: None,
            provisioning_end_time: None,
            state: ProvisioningState::Initial,
            cause: None,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == ProvisioningState::Started
    }
}

/// A transition that has not been persisted yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLifecycleRecord {
    pub provisioning_start_time: Option<DateTime<Utc>>,
    pub provisioning_end_time: Option<DateTime<Utc>>,
    pub state: ProvisioningState,
    pub cause: Option<String>,
}

impl NewLifecycleRecord {
    /// Build the next record after `previous`.
    ///
    /// A `STARTED` record opens a new run at `now`. Every other state keeps
    /// the start time of the run it follows and closes it at `now`.
    #[must_use]
    pub fn following(
        previous: &LifecycleRecord,
        state: ProvisioningState,
        now: DateTime<Utc>,
    ) -> Self {
        if state == ProvisioningState::Started {
            Self {
                provisioning_start_time: Some(now),
                provisioning_end_time: None,
                state,
                cause: None,
            }
        } else {
            Self {
                provisioning_start_time: previous.provisioning_start_time,
                provisioning_end_time: Some(now),
                state,
                cause: None,
            }
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Attach the id assigned by a store.
    #[must_use]
    pub fn into_record(self, id: u64) -> LifecycleRecord {
        LifecycleRecord {
            id,
            provisioning_start_time: self.provisioning_start_time,
            provisioning_end_time: self.provisioning_end_time,
            state: self.state,
            cause: self.cause,
        }
    }
}
