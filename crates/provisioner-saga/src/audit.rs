use std::time::Instant;

/// Outcome of one compensation during rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompensationStatus {
    /// The compensation ran and succeeded.
    Compensated,
    /// No snapshot was recorded, so there was nothing to undo.
    Skipped,
    /// The compensation ran and failed.
    Failed,
}

/// Record of a single compensation.
#[derive(Debug)]
pub struct CompensationRecord {
    /// Name of the compensation.
    pub name: String,
    /// What happened.
    pub status: CompensationStatus,
    /// When the compensation was visited.
    pub at: Instant,
}

/// Audit log of a rollback, in execution order.
#[derive(Debug, Default)]
pub struct RollbackAuditLog {
    records: Vec<CompensationRecord>,
}

impl RollbackAuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, name: &str, status: CompensationStatus) {
        self.records.push(CompensationRecord {
            name: name.to_string(),
            status,
            at: Instant::now(),
        });
    }

    /// Get all records in the audit log.
    #[must_use]
    pub fn records(&self) -> &[CompensationRecord] {
        &self.records
    }

    /// Names of the compensations that actually ran, in order.
    #[must_use]
    pub fn compensated(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.status == CompensationStatus::Compensated)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Get a summary of the rollback for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                CompensationStatus::Compensated => "↩",
                CompensationStatus::Skipped => "·",
                CompensationStatus::Failed => "⚠",
            };
            lines.push(format!("{status} {}", record.name));
        }
        lines.join("\n")
    }
}
