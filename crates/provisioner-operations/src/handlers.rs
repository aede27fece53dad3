use provisioner_saga::{StepChain, StepHandler};

use crate::OperationError;
use crate::context::ProvisioningContext;
use crate::steps::{
    LogWorkStep, PushAugmentationsStep, PushDefinitionsStep, SnapshotDefinitionsStep,
};
use crate::types::ProvisioningWork;

pub type ProvisioningStepHandler = StepHandler<ProvisioningWork, OperationError>;

/// Snapshots the local definition store, then pushes KPI definitions.
#[must_use]
pub fn kpi_handler(ctx: &ProvisioningContext) -> ProvisioningStepHandler {
    StepHandler::new(
        "kpi",
        StepChain::new(LogWorkStep::new("kpi"))
            .then(SnapshotDefinitionsStep::new(ctx.clone()))
            .then(PushDefinitionsStep::new(ctx.clone())),
    )
}

/// Pushes augmentation rules. Nothing it does is compensable.
#[must_use]
pub fn augmentation_handler(ctx: &ProvisioningContext) -> ProvisioningStepHandler {
    StepHandler::new(
        "augmentation",
        StepChain::new(LogWorkStep::new("augmentation"))
            .then(PushAugmentationsStep::new(ctx.clone())),
    )
}
