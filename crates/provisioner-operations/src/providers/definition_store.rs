use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use tracing::debug;

use crate::Result;
use crate::error::OperationError;
use crate::traits::DefinitionStore;
use crate::traits::definition_store::upsert;
use crate::types::CalculatorDefinition;

/// Definition store kept in a single JSON file.
///
/// A missing file reads as an empty store.
#[derive(Debug)]
pub struct FileDefinitionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileDefinitionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<CalculatorDefinition>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|source| OperationError::DefinitionStoreRead {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| OperationError::DefinitionStoreParse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        let content = serde_json::to_string_pretty(definitions).map_err(|source| {
            OperationError::PayloadSerialize {
                system: "definition store",
                source,
            }
        })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| OperationError::DefinitionStoreWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, content).map_err(|source| OperationError::DefinitionStoreWrite {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            path = %self.path.display(),
            count = definitions.len(),
            "wrote definition store"
        );
        Ok(())
    }
}

impl DefinitionStore for FileDefinitionStore {
    fn load_all(&self) -> Result<Vec<CalculatorDefinition>> {
        self.read()
    }

    fn save_all(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| OperationError::Poisoned)?;
        let mut stored = self.read()?;
        upsert(&mut stored, definitions);
        self.write(&stored)
    }

    fn replace_all(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| OperationError::Poisoned)?;
        self.write(definitions)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    definitions: RwLock<Vec<CalculatorDefinition>>,
}

impl InMemoryDefinitionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_definitions(definitions: Vec<CalculatorDefinition>) -> Self {
        Self {
            definitions: RwLock::new(definitions),
        }
    }
}

impl DefinitionStore for InMemoryDefinitionStore {
    fn load_all(&self) -> Result<Vec<CalculatorDefinition>> {
        self.definitions
            .read()
            .map(|d| d.clone())
            .map_err(|_| OperationError::Poisoned)
    }

    fn save_all(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        let mut stored = self
            .definitions
            .write()
            .map_err(|_| OperationError::Poisoned)?;
        upsert(&mut stored, definitions);
        Ok(())
    }

    fn replace_all(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        let mut stored = self
            .definitions
            .write()
            .map_err(|_| OperationError::Poisoned)?;
        *stored = definitions.to_vec();
        Ok(())
    }
}
