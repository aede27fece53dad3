use tracing::info;

use crate::Result;
use crate::traits::{AugmentationClient, CalculatorClient};
use crate::types::{AugmentationRule, CalculatorDefinition};

/// Calculator client that only logs what it would push.
#[derive(Debug, Default)]
pub struct DryRunCalculatorClient;

impl DryRunCalculatorClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CalculatorClient for DryRunCalculatorClient {
    fn push_definitions(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        for definition in definitions {
            info!(
                system = self.system(),
                id = %definition.id,
                expression = %definition.expression,
                threshold = definition.reliability_threshold,
                "dry run: would push definition"
            );
        }
        Ok(())
    }
}

/// Augmentation client that only logs what it would push.
#[derive(Debug, Default)]
pub struct DryRunAugmentationClient;

impl DryRunAugmentationClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AugmentationClient for DryRunAugmentationClient {
    fn push_augmentations(&self, rules: &[AugmentationRule]) -> Result<()> {
        for rule in rules {
            info!(
                system = self.system(),
                id = %rule.id,
                kpi = %rule.kpi_id,
                field = %rule.field,
                "dry run: would push augmentation"
            );
        }
        Ok(())
    }
}
