use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaultError {
    #[error("fault channel requires a running tokio runtime")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),

    #[error("fault pool capacity must be at least 1")]
    ZeroCapacity,
}

/// A remote system was updated but the local record could not be written.
///
/// Distinguishes "remote changed, local didn't" from a plain failure where
/// nothing happened remotely.
#[derive(Debug, Error)]
#[error("'{operation}' updated the remote system but failed to persist {count} item(s) locally")]
pub struct DivergenceError<E> {
    pub operation: String,
    pub count: u64,
    #[source]
    pub source: E,
}
