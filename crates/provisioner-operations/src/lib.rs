mod error;

pub mod context;
pub mod handlers;
pub mod operations;
pub mod providers;
pub mod steps;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod mocks;

pub use error::{CompensationFailure, OperationError, Result};
