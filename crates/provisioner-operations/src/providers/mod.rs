mod definition_store;
mod dry_run;
mod outbox;
mod work_file;

pub use definition_store::{FileDefinitionStore, InMemoryDefinitionStore};
pub use dry_run::{DryRunAugmentationClient, DryRunCalculatorClient};
pub use outbox::{OutboxAugmentationClient, OutboxCalculatorClient};
pub use work_file::load_work_file;
