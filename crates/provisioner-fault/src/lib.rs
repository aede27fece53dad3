//! Consistency fault reporting.
//!
//! When a remote system accepted a change but the local record of it could
//! not be written, the two have diverged. Publishers report that through a
//! [`FaultChannel`] without blocking; a [`FaultMonitor`] consumes the events
//! on a bounded pool and keeps a running count exposed as a [`FaultGauge`].

mod channel;
mod error;
mod event;
mod monitor;

pub use channel::{DEFAULT_POOL_CAPACITY, FaultChannel};
pub use error::{DivergenceError, FaultError};
pub use event::{ConsistencyFault, FaultType};
pub use monitor::{FaultGauge, FaultMonitor, FaultSubscriber};
