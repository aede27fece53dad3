use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, info, warn};

use crate::event::{ConsistencyFault, FaultType};

/// Consumer of consistency faults.
///
/// Invoked on a worker task, never on the publisher's thread.
pub trait FaultSubscriber: Send + Sync + 'static {
    fn on_fault(&self, fault: &ConsistencyFault);
}

/// Read-only handle to the running fault count, for metrics export.
#[derive(Debug, Clone)]
pub struct FaultGauge(Arc<AtomicU64>);

impl FaultGauge {
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

/// Subscriber that logs every fault and keeps the running divergence count.
#[derive(Debug, Default)]
pub struct FaultMonitor {
    count: Arc<AtomicU64>,
}

impl FaultMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fault_count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn gauge(&self) -> FaultGauge {
        FaultGauge(Arc::clone(&self.count))
    }
}

impl FaultSubscriber for FaultMonitor {
    fn on_fault(&self, fault: &ConsistencyFault) {
        match fault.fault_type {
            FaultType::Ok => {
                debug!(fault = %fault.fault_type, "consistency check ok");
            }
            FaultType::Suspect => {
                let total = self.count.fetch_add(fault.count, Ordering::AcqRel) + fault.count;
                warn!(
                    fault = %fault.fault_type,
                    count = fault.count,
                    total,
                    "remote state may have diverged from local records"
                );
            }
            FaultType::Failure => {
                let total = self.count.fetch_add(fault.count, Ordering::AcqRel) + fault.count;
                error!(
                    fault = %fault.fault_type,
                    count = fault.count,
                    total,
                    "remote state diverged from local records"
                );
            }
            FaultType::Clear => {
                let cleared = self.count.swap(0, Ordering::AcqRel);
                info!(fault = %fault.fault_type, cleared, "consistency faults cleared");
            }
        }
    }
}
