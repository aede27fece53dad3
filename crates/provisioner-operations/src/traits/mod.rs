mod clients;
pub(crate) mod definition_store;

pub use clients::{AugmentationClient, CalculatorClient};
pub use definition_store::DefinitionStore;
