use crate::Result;
use crate::types::{AugmentationRule, CalculatorDefinition};

/// Pushes KPI definitions to the stats calculator.
pub trait CalculatorClient: Send + Sync {
    /// Short name used in logs and errors.
    fn system(&self) -> &'static str {
        "stats calculator"
    }

    /// Create or update `definitions` remotely.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote system did not accept the definitions.
    fn push_definitions(&self, definitions: &[CalculatorDefinition]) -> Result<()>;
}

/// Pushes enrichment rules to the augmentation service.
pub trait AugmentationClient: Send + Sync {
    /// Short name used in logs and errors.
    fn system(&self) -> &'static str {
        "augmentation service"
    }

    /// Create or update `rules` remotely.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote system did not accept the rules.
    fn push_augmentations(&self, rules: &[AugmentationRule]) -> Result<()>;
}
