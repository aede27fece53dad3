mod interrupt;
mod provision;
mod reset;
mod status;

pub use interrupt::InterruptOperation;
pub use provision::{ProvisionOperation, ProvisionOutcome};
pub use reset::ResetOperation;
pub use status::{StatusOperation, StatusReport};
