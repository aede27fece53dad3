use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::Handle;
use tokio::sync::{Notify, Semaphore};
use tracing::{debug, warn};

use crate::error::{DivergenceError, FaultError};
use crate::event::ConsistencyFault;
use crate::monitor::FaultSubscriber;

/// Maximum number of fault events consumed concurrently.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// Non-blocking publisher of consistency faults.
///
/// Each published event is consumed on its own task; at most `capacity`
/// consumers run at once and the rest wait for a permit. The publisher never
/// waits for, or learns the outcome of, consumption. Clones share the pool.
#[derive(Clone)]
pub struct FaultChannel {
    handle: Handle,
    subscriber: Arc<dyn FaultSubscriber>,
    permits: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<InFlight>,
}

#[derive(Default)]
struct InFlight {
    pending: AtomicUsize,
    idle: Notify,
}

/// Decrements the in-flight count even if the subscriber panics.
struct PendingTicket(Arc<InFlight>);

impl Drop for PendingTicket {
    fn drop(&mut self) {
        if self.0.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl FaultChannel {
    /// Create a channel that spawns consumers on `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(
        handle: Handle,
        subscriber: Arc<dyn FaultSubscriber>,
        capacity: usize,
    ) -> Result<Self, FaultError> {
        if capacity == 0 {
            return Err(FaultError::ZeroCapacity);
        }
        Ok(Self {
            handle,
            subscriber,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(InFlight::default()),
        })
    }

    /// Create a channel on the current tokio runtime with the default capacity.
    ///
    /// # Errors
    ///
    /// Returns [`FaultError::NoRuntime`] when called outside a runtime.
    pub fn on_current_runtime(subscriber: Arc<dyn FaultSubscriber>) -> Result<Self, FaultError> {
        let handle = Handle::try_current().map_err(FaultError::NoRuntime)?;
        Self::new(handle, subscriber, DEFAULT_POOL_CAPACITY)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events published but not yet fully consumed.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.pending.load(Ordering::Acquire)
    }

    /// Hand `fault` to the consumer pool and return immediately.
    pub fn publish(&self, fault: ConsistencyFault) {
        self.in_flight.pending.fetch_add(1, Ordering::AcqRel);
        let ticket = PendingTicket(Arc::clone(&self.in_flight));
        let permits = Arc::clone(&self.permits);
        let subscriber = Arc::clone(&self.subscriber);

        debug!(fault = %fault.fault_type, count = fault.count, "publishing consistency fault");
        self.handle.spawn(async move {
            let _ticket = ticket;
            let Ok(_permit) = permits.acquire_owned().await else {
                warn!(fault = %fault.fault_type, "fault pool closed, dropping event");
                return;
            };
            subscriber.on_fault(&fault);
        });
    }

    /// Publish a `SUSPECT` fault for `count` items and wrap `source`.
    ///
    /// The returned error is meant to be propagated to the caller so the
    /// operation is still reported as failed.
    pub fn report_divergence<E>(
        &self,
        operation: impl Into<String>,
        count: u64,
        source: E,
    ) -> DivergenceError<E> {
        let operation = operation.into();
        warn!(
            operation = %operation,
            count,
            "local persistence failed after successful remote update"
        );
        self.publish(ConsistencyFault::suspect(count));
        DivergenceError {
            operation,
            count,
            source,
        }
    }

    /// Wait until every event published so far has been consumed.
    pub async fn drain(&self) {
        loop {
            let idle = self.in_flight.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }
}
