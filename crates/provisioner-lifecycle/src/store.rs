use std::sync::RwLock;

use crate::error::{LifecycleError, Result};
use crate::record::{LifecycleRecord, NewLifecycleRecord};

/// Persistence for lifecycle records.
///
/// Implementations are append-only and assign strictly increasing ids, so
/// the latest record is always the one with the highest id.
pub trait LifecycleStore: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    fn save(&self, record: NewLifecycleRecord) -> Result<LifecycleRecord>;

    /// The most recently persisted record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn find_latest(&self) -> Result<Option<LifecycleRecord>>;

    /// Every persisted record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn history(&self) -> Result<Vec<LifecycleRecord>>;
}

/// Lifecycle store that lives for the duration of the process.
#[derive(Debug, Default)]
pub struct InMemoryLifecycleStore {
    records: RwLock<Vec<LifecycleRecord>>,
}

impl InMemoryLifecycleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LifecycleStore for InMemoryLifecycleStore {
    fn save(&self, record: NewLifecycleRecord) -> Result<LifecycleRecord> {
        let mut records = self.records.write().map_err(|_| LifecycleError::Poisoned)?;
        let id = records.last().map_or(1, |r| r.id + 1);
        let saved = record.into_record(id);
        records.push(saved.clone());
        Ok(saved)
    }

    fn find_latest(&self) -> Result<Option<LifecycleRecord>> {
        let records = self.records.read().map_err(|_| LifecycleError::Poisoned)?;
        Ok(records.last().cloned())
    }

    fn history(&self) -> Result<Vec<LifecycleRecord>> {
        let records = self.records.read().map_err(|_| LifecycleError::Poisoned)?;
        Ok(records.clone())
    }
}
