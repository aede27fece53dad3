use std::sync::Arc;

use provisioner_fault::{ConsistencyFault, FaultChannel};
use provisioner_lifecycle::{
    LifecycleRecord, LifecycleStore, ProvisioningState, ProvisioningTracker,
    check_state_transition, ensure_not_running,
};
use tracing::info;

use crate::Result;

/// Clears a finished, failed or interrupted run so a new one may start.
///
/// Also clears the running consistency fault count.
pub struct ResetOperation<S> {
    tracker: Arc<ProvisioningTracker<S>>,
    faults: FaultChannel,
}

impl<S: LifecycleStore> ResetOperation<S> {
    pub fn new(tracker: Arc<ProvisioningTracker<S>>, faults: FaultChannel) -> Self {
        Self { tracker, faults }
    }

    /// # Errors
    ///
    /// Returns a conflict while a run is `STARTED`, or an invalid transition
    /// if the lifecycle is already reset.
    pub fn execute(&self) -> Result<LifecycleRecord> {
        let current = self.tracker.current_provisioning_state()?;
        ensure_not_running(&current)?;
        check_state_transition(current.state, ProvisioningState::Reset)?;

        let record = self.tracker.reset_provisioning()?;
        self.faults.publish(ConsistencyFault::clear());
        info!(id = record.id, previous = %current.state, "provisioning reset");
        Ok(record)
    }
}
