//! Provisioning lifecycle state machine.
//!
//! Every lifecycle transition is persisted as a new [`LifecycleRecord`]; the
//! most recent record is the current state. [`ProvisioningTracker`] is the
//! only writer. Callers gate new runs on the current state themselves, see
//! [`ensure_not_running`].

mod error;
mod file_store;
mod record;
mod state;
mod store;
mod tracker;

pub use error::{LifecycleError, Result};
pub use file_store::FileLifecycleStore;
pub use record::{LifecycleRecord, NewLifecycleRecord};
pub use state::{ProvisioningState, check_state_transition};
pub use store::{InMemoryLifecycleStore, LifecycleStore};
pub use tracker::{ProvisioningTracker, ShutdownGuard, ensure_not_running, watch_shutdown};
