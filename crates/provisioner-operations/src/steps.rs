use provisioner_saga::{AtomicStep, UndoSlot};
use tracing::{debug, info};

use crate::OperationError;
use crate::context::ProvisioningContext;
use crate::types::{CalculatorDefinition, ProvisioningWork};

/// Logs the size of the work item. Nothing to undo.
pub struct LogWorkStep {
    handler: &'static str,
}

impl LogWorkStep {
    #[must_use]
    pub fn new(handler: &'static str) -> Self {
        Self { handler }
    }
}

impl AtomicStep<ProvisioningWork> for LogWorkStep {
    type Snapshot = ();
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "log_work"
    }

    fn execute(
        &self,
        input: &ProvisioningWork,
        _undo: UndoSlot<'_, ()>,
    ) -> Result<(), Self::Error> {
        info!(
            handler = self.handler,
            definitions = input.definitions.len(),
            augmentations = input.augmentations.len(),
            "provisioning work received"
        );
        Ok(())
    }
}

/// Captures the local definition store so a later failure can restore it.
pub struct SnapshotDefinitionsStep {
    ctx: ProvisioningContext,
}

impl SnapshotDefinitionsStep {
    #[must_use]
    pub fn new(ctx: ProvisioningContext) -> Self {
        Self { ctx }
    }
}

impl AtomicStep<ProvisioningWork> for SnapshotDefinitionsStep {
    type Snapshot = Vec<CalculatorDefinition>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "snapshot_definitions"
    }

    fn execute(
        &self,
        input: &ProvisioningWork,
        undo: UndoSlot<'_, Self::Snapshot>,
    ) -> Result<(), Self::Error> {
        if input.definitions.is_empty() {
            debug!("no definitions in work item, nothing to snapshot");
            return Ok(());
        }
        let current = self.ctx.store().load_all()?;
        debug!(count = current.len(), "captured definition store snapshot");
        undo.record(current);
        Ok(())
    }

    fn compensate(&self, snapshot: Self::Snapshot) -> Result<(), Self::Error> {
        info!(
            count = snapshot.len(),
            "restoring definition store from snapshot"
        );
        self.ctx.store().replace_all(&snapshot)
    }
}

/// Pushes transformed definitions to the stats calculator, then records
/// them locally.
///
/// A local write failure after the remote push succeeded cannot be undone
/// remotely; it is reported as a divergence instead.
pub struct PushDefinitionsStep {
    ctx: ProvisioningContext,
}

impl PushDefinitionsStep {
    #[must_use]
    pub fn new(ctx: ProvisioningContext) -> Self {
        Self { ctx }
    }
}

impl AtomicStep<ProvisioningWork> for PushDefinitionsStep {
    type Snapshot = ();
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "push_definitions"
    }

    fn execute(
        &self,
        input: &ProvisioningWork,
        _undo: UndoSlot<'_, ()>,
    ) -> Result<(), Self::Error> {
        if input.definitions.is_empty() {
            return Ok(());
        }
        let transform = self.ctx.transform();
        let definitions: Vec<_> = input
            .definitions
            .iter()
            .map(|kpi| CalculatorDefinition::from_kpi(kpi, transform))
            .collect();

        self.ctx.calculator().push_definitions(&definitions)?;
        debug!(
            system = self.ctx.calculator().system(),
            count = definitions.len(),
            "definitions accepted remotely"
        );

        if let Err(e) = self.ctx.store().save_all(&definitions) {
            let count = u64::try_from(definitions.len()).unwrap_or(u64::MAX);
            return Err(self
                .ctx
                .faults()
                .report_divergence(self.name(), count, Box::new(e))
                .into());
        }
        Ok(())
    }
}

/// Pushes enrichment rules to the augmentation service.
pub struct PushAugmentationsStep {
    ctx: ProvisioningContext,
}

impl PushAugmentationsStep {
    #[must_use]
    pub fn new(ctx: ProvisioningContext) -> Self {
        Self { ctx }
    }
}

impl AtomicStep<ProvisioningWork> for PushAugmentationsStep {
    type Snapshot = ();
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "push_augmentations"
    }

    fn execute(
        &self,
        input: &ProvisioningWork,
        _undo: UndoSlot<'_, ()>,
    ) -> Result<(), Self::Error> {
        if input.augmentations.is_empty() {
            return Ok(());
        }
        self.ctx
            .augmentation()
            .push_augmentations(&input.augmentations)?;
        debug!(
            system = self.ctx.augmentation().system(),
            count = input.augmentations.len(),
            "augmentations accepted remotely"
        );
        Ok(())
    }
}
