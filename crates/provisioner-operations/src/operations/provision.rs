use std::sync::Arc;

use provisioner_lifecycle::{
    LifecycleRecord, LifecycleStore, ProvisioningState, ProvisioningTracker,
    check_state_transition, ensure_not_running,
};
use provisioner_saga::HandlerChain;
use tracing::{info, warn};

use crate::Result;
use crate::context::ProvisioningContext;
use crate::error::OperationError;
use crate::handlers::{augmentation_handler, kpi_handler};
use crate::types::ProvisioningWork;

#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub definitions_pushed: usize,
    pub augmentations_pushed: usize,
    /// The `COMPLETED` record closing the run.
    pub record: LifecycleRecord,
}

/// One provisioning run: KPI definitions first, then augmentation rules.
pub struct ProvisionOperation<S> {
    tracker: Arc<ProvisioningTracker<S>>,
    ctx: ProvisioningContext,
}

impl<S: LifecycleStore> ProvisionOperation<S> {
    pub fn new(tracker: Arc<ProvisioningTracker<S>>, ctx: ProvisioningContext) -> Self {
        Self { tracker, ctx }
    }

    fn handler_chain(&self) -> HandlerChain<ProvisioningWork, OperationError> {
        HandlerChain::new(kpi_handler(&self.ctx)).then(augmentation_handler(&self.ctx))
    }

    /// Gate on the lifecycle, run every handler, and roll back on failure.
    ///
    /// # Errors
    ///
    /// Returns a conflict if a run is already `STARTED`, an invalid
    /// transition if the lifecycle must be reset first, or the handler
    /// failure wrapped with the outcome of its rollback. A failure to record
    /// the `ERROR` state is logged and never replaces the handler failure.
    pub fn execute(&self, work: &ProvisioningWork) -> Result<ProvisionOutcome> {
        let current = self.tracker.current_provisioning_state()?;
        ensure_not_running(&current)?;
        check_state_transition(current.state, ProvisioningState::Started)?;

        let started = self.tracker.start_provisioning()?;
        info!(
            id = started.id,
            definitions = work.definitions.len(),
            augmentations = work.augmentations.len(),
            "provisioning started"
        );

        let mut chain = self.handler_chain();
        match chain.apply(work) {
            Ok(()) => {
                let record = self.tracker.stop_provisioning()?;
                Ok(ProvisionOutcome {
                    definitions_pushed: work.definitions.len(),
                    augmentations_pushed: work.augmentations.len(),
                    record,
                })
            }
            Err(error) => {
                warn!(%error, "provisioning failed, rolling back");
                let (rollback, audit) = chain.rollback().apply_with_audit();
                info!(summary = %audit.summary(), "rollback finished");

                let error = error.rolled_back(rollback);
                if let Err(store_error) = self.tracker.stop_provisioning_with_error(&error) {
                    warn!(%store_error, "failed to record provisioning failure");
                }
                Err(error)
            }
        }
    }
}
