use std::fs;
use std::path::{Path, PathBuf};

use provisioner_fault::DEFAULT_POOL_CAPACITY;
use provisioner_operations::types::TransformConfig;
use serde::Deserialize;

use crate::error::{CliError, Result};

pub(crate) const DEFAULT_CONFIG_FILE: &str = "provisioner.toml";

/// Which downstream clients a run talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ClientMode {
    /// Log the payloads without sending them anywhere.
    #[default]
    DryRun,
    /// Queue payloads as JSON files for a delivery agent.
    Outbox,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct ClientConfig {
    pub(crate) mode: ClientMode,
    pub(crate) outbox_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: ClientMode::default(),
            outbox_dir: PathBuf::from(".provisioner/outbox"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct FaultConfig {
    pub(crate) pool_capacity: usize,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

/// Contents of `provisioner.toml`. Every field is optional.
///
/// Relative paths are resolved against the directory holding the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct ProvisionerConfig {
    pub(crate) state_file: PathBuf,
    pub(crate) definitions_file: PathBuf,
    pub(crate) client: ClientConfig,
    pub(crate) transform: TransformConfig,
    pub(crate) faults: FaultConfig,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(".provisioner/state.toml"),
            definitions_file: PathBuf::from(".provisioner/definitions.json"),
            client: ClientConfig::default(),
            transform: TransformConfig::default(),
            faults: FaultConfig::default(),
        }
    }
}

impl ProvisionerConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, `provisioner.toml` in
    /// `cwd` is used when present and defaults otherwise.
    pub(crate) fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (cwd.join(path), true),
            None => (cwd.join(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default().resolved_against(cwd));
        }

        let content = fs::read_to_string(&path).map_err(|source| CliError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| CliError::ConfigParse {
            path: path.clone(),
            source,
        })?;
        let base = path.parent().unwrap_or(cwd);
        Ok(config.resolved_against(base))
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        self.state_file = base.join(&self.state_file);
        self.definitions_file = base.join(&self.definitions_file);
        self.client.outbox_dir = base.join(&self.client.outbox_dir);
        self
    }
}
