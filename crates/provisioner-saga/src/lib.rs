//! Compensable provisioning pipelines.
//!
//! A [`ForwardChain`] broadcasts one shared input to a sequence of operators
//! and stops at the first failure. Atomic steps record the data needed to undo
//! their own effect while they run; a [`StepChain`] turns those records into a
//! [`CompensatingChain`] that undoes the applied steps in reverse order.
//! [`HandlerChain`] composes whole units of work and decides whether a
//! rollback is still meaningful.

mod audit;
mod chain;
mod compensation;
mod erased;
mod error;
mod handler;
mod step;

pub use audit::{CompensationRecord, CompensationStatus, RollbackAuditLog};
pub use chain::{FnOperator, ForwardChain, Operator, operator};
pub use compensation::{CompensatingChain, CompensatingNode, Compensation};
pub use error::{CompensationError, RollbackError};
pub use handler::{HandlerChain, ProvisioningHandler, StepHandler};
pub use step::{AtomicStep, StepChain, UndoSlot};
