use std::sync::Arc;

use provisioner_fault::FaultChannel;

use crate::traits::{AugmentationClient, CalculatorClient, DefinitionStore};
use crate::types::TransformConfig;

/// Collaborators shared by every step of a provisioning run.
#[derive(Clone)]
pub struct ProvisioningContext {
    calculator: Arc<dyn CalculatorClient>,
    augmentation: Arc<dyn AugmentationClient>,
    store: Arc<dyn DefinitionStore>,
    faults: FaultChannel,
    transform: TransformConfig,
}

impl ProvisioningContext {
    pub fn new(
        calculator: Arc<dyn CalculatorClient>,
        augmentation: Arc<dyn AugmentationClient>,
        store: Arc<dyn DefinitionStore>,
        faults: FaultChannel,
    ) -> Self {
        Self {
            calculator,
            augmentation,
            store,
            faults,
            transform: TransformConfig::default(),
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn calculator(&self) -> &dyn CalculatorClient {
        self.calculator.as_ref()
    }

    #[must_use]
    pub fn augmentation(&self) -> &dyn AugmentationClient {
        self.augmentation.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &dyn DefinitionStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn faults(&self) -> &FaultChannel {
        &self.faults
    }

    #[must_use]
    pub fn transform(&self) -> &TransformConfig {
        &self.transform
    }
}
