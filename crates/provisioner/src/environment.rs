use std::sync::Arc;

use provisioner_fault::{FaultChannel, FaultGauge, FaultMonitor};
use provisioner_lifecycle::{FileLifecycleStore, ProvisioningTracker};
use provisioner_operations::context::ProvisioningContext;
use provisioner_operations::providers::{
    DryRunAugmentationClient, DryRunCalculatorClient, FileDefinitionStore,
    OutboxAugmentationClient, OutboxCalculatorClient,
};
use provisioner_operations::traits::{AugmentationClient, CalculatorClient};
use tokio::runtime::Handle;
use tracing::debug;

use crate::config::{ClientMode, ProvisionerConfig};
use crate::error::Result;

pub(crate) type Tracker = ProvisioningTracker<FileLifecycleStore>;

/// Collaborators wired from the loaded config.
pub(crate) struct Environment {
    pub(crate) tracker: Arc<Tracker>,
    pub(crate) faults: FaultChannel,
    pub(crate) gauge: FaultGauge,
    config: ProvisionerConfig,
}

impl Environment {
    pub(crate) fn new(config: &ProvisionerConfig, handle: Handle) -> Result<Self> {
        let monitor = Arc::new(FaultMonitor::new());
        let gauge = monitor.gauge();
        let faults = FaultChannel::new(handle, monitor, config.faults.pool_capacity)?;
        let tracker = Arc::new(ProvisioningTracker::new(FileLifecycleStore::new(
            config.state_file.clone(),
        )));
        debug!(
            state_file = %config.state_file.display(),
            definitions_file = %config.definitions_file.display(),
            mode = ?config.client.mode,
            "environment ready"
        );
        Ok(Self {
            tracker,
            faults,
            gauge,
            config: config.clone(),
        })
    }

    pub(crate) fn context(&self) -> ProvisioningContext {
        let (calculator, augmentation): (Arc<dyn CalculatorClient>, Arc<dyn AugmentationClient>) =
            match self.config.client.mode {
                ClientMode::DryRun => (
                    Arc::new(DryRunCalculatorClient::new()),
                    Arc::new(DryRunAugmentationClient::new()),
                ),
                ClientMode::Outbox => (
                    Arc::new(OutboxCalculatorClient::new(&self.config.client.outbox_dir)),
                    Arc::new(OutboxAugmentationClient::new(&self.config.client.outbox_dir)),
                ),
            };
        ProvisioningContext::new(
            calculator,
            augmentation,
            Arc::new(FileDefinitionStore::new(&self.config.definitions_file)),
            self.faults.clone(),
        )
        .with_transform(self.config.transform)
    }

    pub(crate) fn client_mode(&self) -> ClientMode {
        self.config.client.mode
    }

    pub(crate) fn config(&self) -> &ProvisionerConfig {
        &self.config
    }
}
