use std::sync::{Arc, Mutex};

use provisioner_fault::{FaultChannel, FaultMonitor};
use provisioner_lifecycle::{
    InMemoryLifecycleStore, LifecycleError, LifecycleRecord, LifecycleStore, NewLifecycleRecord,
    ProvisioningState,
};

use crate::Result;
use crate::context::ProvisioningContext;
use crate::error::OperationError;
use crate::providers::InMemoryDefinitionStore;
use crate::traits::{AugmentationClient, CalculatorClient, DefinitionStore};
use crate::types::{AugmentationRule, CalculatorDefinition, KpiDefinition};

#[derive(Default)]
pub struct MockCalculatorClient {
    pushed: Mutex<Vec<Vec<CalculatorDefinition>>>,
    reject: Option<String>,
}

impl MockCalculatorClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn pushed(&self) -> Vec<Vec<CalculatorDefinition>> {
        self.pushed.lock().expect("pushed lock").clone()
    }
}

impl CalculatorClient for MockCalculatorClient {
    fn push_definitions(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        if let Some(reason) = &self.reject {
            return Err(OperationError::RemoteRejected {
                system: self.system(),
                reason: reason.clone(),
            });
        }
        self.pushed
            .lock()
            .map_err(|_| OperationError::Poisoned)?
            .push(definitions.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockAugmentationClient {
    pushed: Mutex<Vec<AugmentationRule>>,
    reject: Option<String>,
}

impl MockAugmentationClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn pushed(&self) -> Vec<AugmentationRule> {
        self.pushed.lock().expect("pushed lock").clone()
    }
}

impl AugmentationClient for MockAugmentationClient {
    fn push_augmentations(&self, rules: &[AugmentationRule]) -> Result<()> {
        if let Some(reason) = &self.reject {
            return Err(OperationError::RemoteRejected {
                system: self.system(),
                reason: reason.clone(),
            });
        }
        self.pushed
            .lock()
            .map_err(|_| OperationError::Poisoned)?
            .extend_from_slice(rules);
        Ok(())
    }
}

/// Store whose upserts always fail; reads and restores work.
#[derive(Default)]
pub struct FailingSaveStore {
    inner: InMemoryDefinitionStore,
}

impl FailingSaveStore {
    #[must_use]
    pub fn with_definitions(definitions: Vec<CalculatorDefinition>) -> Self {
        Self {
            inner: InMemoryDefinitionStore::with_definitions(definitions),
        }
    }
}

impl DefinitionStore for FailingSaveStore {
    fn load_all(&self) -> Result<Vec<CalculatorDefinition>> {
        self.inner.load_all()
    }

    fn save_all(&self, _definitions: &[CalculatorDefinition]) -> Result<()> {
        Err(OperationError::DefinitionStoreWrite {
            path: "/mock/definitions.json".into(),
            source: std::io::Error::other("disk full"),
        })
    }

    fn replace_all(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        self.inner.replace_all(definitions)
    }
}

/// Store whose restores always fail; reads and upserts work.
#[derive(Default)]
pub struct FailingRestoreStore {
    inner: InMemoryDefinitionStore,
}

impl DefinitionStore for FailingRestoreStore {
    fn load_all(&self) -> Result<Vec<CalculatorDefinition>> {
        self.inner.load_all()
    }

    fn save_all(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        self.inner.save_all(definitions)
    }

    fn replace_all(&self, _definitions: &[CalculatorDefinition]) -> Result<()> {
        Err(OperationError::DefinitionStoreWrite {
            path: "/mock/definitions.json".into(),
            source: std::io::Error::other("read-only"),
        })
    }
}

/// Lifecycle store that cannot persist `ERROR` records.
#[derive(Default)]
pub struct FailingErrorRecordStore {
    inner: InMemoryLifecycleStore,
}

impl LifecycleStore for FailingErrorRecordStore {
    fn save(&self, record: NewLifecycleRecord) -> provisioner_lifecycle::Result<LifecycleRecord> {
        if record.state == ProvisioningState::Error {
            return Err(LifecycleError::StoreWrite {
                path: "/mock/lifecycle.toml".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.save(record)
    }

    fn find_latest(&self) -> provisioner_lifecycle::Result<Option<LifecycleRecord>> {
        self.inner.find_latest()
    }

    fn history(&self) -> provisioner_lifecycle::Result<Vec<LifecycleRecord>> {
        self.inner.history()
    }
}

/// Mocks wired into a context, with handles kept for assertions.
pub struct MockEnvironment {
    pub calculator: Arc<MockCalculatorClient>,
    pub augmentation: Arc<MockAugmentationClient>,
    pub store: Arc<dyn DefinitionStore>,
    pub monitor: Arc<FaultMonitor>,
    pub faults: FaultChannel,
}

impl MockEnvironment {
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn new(
        calculator: MockCalculatorClient,
        augmentation: MockAugmentationClient,
        store: Arc<dyn DefinitionStore>,
    ) -> Self {
        let monitor = Arc::new(FaultMonitor::new());
        let faults = FaultChannel::on_current_runtime(monitor.clone()).expect("tokio runtime");
        Self {
            calculator: Arc::new(calculator),
            augmentation: Arc::new(augmentation),
            store,
            monitor,
            faults,
        }
    }

    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn accepting() -> Self {
        Self::new(
            MockCalculatorClient::new(),
            MockAugmentationClient::new(),
            Arc::new(InMemoryDefinitionStore::new()),
        )
    }

    #[must_use]
    pub fn context(&self) -> ProvisioningContext {
        ProvisioningContext::new(
            self.calculator.clone(),
            self.augmentation.clone(),
            Arc::clone(&self.store),
            self.faults.clone(),
        )
    }
}

#[must_use]
pub fn make_kpi(id: &str) -> KpiDefinition {
    KpiDefinition {
        id: id.to_string(),
        name: format!("KPI {id}"),
        expression: format!("avg({id})"),
        reliability: 0.9,
    }
}

#[must_use]
pub fn make_rule(id: &str, kpi_id: &str) -> AugmentationRule {
    AugmentationRule {
        id: id.to_string(),
        kpi_id: kpi_id.to_string(),
        field: "site".to_string(),
        value: "north".to_string(),
    }
}

#[must_use]
pub fn make_stored(id: &str) -> CalculatorDefinition {
    CalculatorDefinition {
        id: id.to_string(),
        name: format!("stored {id}"),
        expression: format!("sum({id})"),
        reliability_threshold: 1.0,
    }
}
