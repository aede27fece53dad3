use std::fmt::Debug;

/// Error from a single compensation that failed during rollback.
#[derive(Debug, thiserror::Error)]
#[error("compensation '{compensation}' failed")]
pub struct CompensationError<E> {
    /// Name of the compensation that failed.
    pub compensation: String,
    /// The underlying error.
    #[source]
    pub error: E,
}

/// Error from applying a [`CompensatingChain`](crate::CompensatingChain).
///
/// Rollback is best-effort: every armed compensation is attempted, and the
/// ones that failed are collected here in the order they ran.
#[derive(Debug, thiserror::Error)]
#[error("{} compensation(s) failed during rollback", failures.len())]
pub struct RollbackError<E: Debug> {
    /// Failed compensations, in execution order.
    pub failures: Vec<CompensationError<E>>,
}

impl<E: Debug> RollbackError<E> {
    /// Names of the failed compensations.
    #[must_use]
    pub fn failed_names(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|f| f.compensation.as_str())
            .collect()
    }
}
