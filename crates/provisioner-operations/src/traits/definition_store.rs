use crate::Result;
use crate::types::CalculatorDefinition;

/// Local system-of-record for definitions pushed to the stats calculator.
pub trait DefinitionStore: Send + Sync {
    /// Every stored definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_all(&self) -> Result<Vec<CalculatorDefinition>>;

    /// Insert or update `definitions` by id, keeping the others.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save_all(&self, definitions: &[CalculatorDefinition]) -> Result<()>;

    /// Replace the whole content of the store with `definitions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn replace_all(&self, definitions: &[CalculatorDefinition]) -> Result<()>;
}

/// Merge `updates` into `existing` by id, preserving first-seen order.
pub(crate) fn upsert(existing: &mut Vec<CalculatorDefinition>, updates: &[CalculatorDefinition]) {
    for update in updates {
        match existing.iter_mut().find(|d| d.id == update.id) {
            Some(slot) => *slot = update.clone(),
            None => existing.push(update.clone()),
        }
    }
}
