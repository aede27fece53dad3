use std::sync::Arc;

use provisioner_lifecycle::{
    LifecycleRecord, LifecycleStore, ProvisioningState, ProvisioningTracker,
};

use crate::Result;

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub current: LifecycleRecord,
    /// Every persisted record, oldest first.
    pub history: Vec<LifecycleRecord>,
}

impl StatusReport {
    /// Whether a new run may start right now.
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.current
            .state
            .can_transition_to(ProvisioningState::Started)
    }
}

pub struct StatusOperation<S> {
    tracker: Arc<ProvisioningTracker<S>>,
}

impl<S: LifecycleStore> StatusOperation<S> {
    pub fn new(tracker: Arc<ProvisioningTracker<S>>) -> Self {
        Self { tracker }
    }

    /// # Errors
    ///
    /// Returns an error if the lifecycle store cannot be read.
    pub fn execute(&self) -> Result<StatusReport> {
        Ok(StatusReport {
            current: self.tracker.current_provisioning_state()?,
            history: self.tracker.store().history()?,
        })
    }
}
