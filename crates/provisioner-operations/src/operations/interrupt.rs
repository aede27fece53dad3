use std::sync::Arc;

use provisioner_lifecycle::{
    LifecycleRecord, LifecycleStore, ProvisioningState, ProvisioningTracker,
    check_state_transition,
};

use crate::Result;

/// Marks the in-flight run as abandoned.
pub struct InterruptOperation<S> {
    tracker: Arc<ProvisioningTracker<S>>,
}

impl<S: LifecycleStore> InterruptOperation<S> {
    pub fn new(tracker: Arc<ProvisioningTracker<S>>) -> Self {
        Self { tracker }
    }

    /// # Errors
    ///
    /// Returns an invalid transition unless a run is `STARTED`.
    pub fn execute(&self) -> Result<LifecycleRecord> {
        let current = self.tracker.current_provisioning_state()?;
        check_state_transition(current.state, ProvisioningState::Interrupt)?;
        Ok(self.tracker.interrupt_provisioning()?)
    }
}
