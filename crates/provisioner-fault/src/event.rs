use std::fmt;

/// Kind of consistency fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    /// Marker that everything is consistent; carries no count.
    Ok,
    /// Remote state possibly diverged from the local record.
    Suspect,
    /// Remote state confirmed to have diverged.
    Failure,
    /// Operator acknowledged the divergence; the running count restarts.
    Clear,
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Suspect => "SUSPECT",
            Self::Failure => "FAILURE",
            Self::Clear => "CLEAR",
        })
    }
}

/// An ephemeral fault notification; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyFault {
    pub fault_type: FaultType,
    /// Number of affected items.
    pub count: u64,
}

impl ConsistencyFault {
    #[must_use]
    pub fn new(fault_type: FaultType, count: u64) -> Self {
        Self { fault_type, count }
    }

    #[must_use]
    pub fn ok() -> Self {
        Self::new(FaultType::Ok, 0)
    }

    #[must_use]
    pub fn suspect(count: u64) -> Self {
        Self::new(FaultType::Suspect, count)
    }

    #[must_use]
    pub fn failure(count: u64) -> Self {
        Self::new(FaultType::Failure, count)
    }

    #[must_use]
    pub fn clear() -> Self {
        Self::new(FaultType::Clear, 0)
    }

    /// Whether this event adds to the running fault count.
    #[must_use]
    pub fn is_divergence(&self) -> bool {
        matches!(self.fault_type, FaultType::Suspect | FaultType::Failure)
    }
}
