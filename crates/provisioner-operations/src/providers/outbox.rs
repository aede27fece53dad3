use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::info;

use crate::Result;
use crate::error::OperationError;
use crate::traits::{AugmentationClient, CalculatorClient};
use crate::types::{AugmentationRule, CalculatorDefinition};

/// Writes each payload as a numbered JSON document into a directory that a
/// delivery agent forwards to the remote system.
#[derive(Debug)]
struct Outbox {
    dir: PathBuf,
    prefix: &'static str,
    sequence: AtomicU64,
}

impl Outbox {
    fn new(dir: PathBuf, prefix: &'static str) -> Self {
        Self {
            dir,
            prefix,
            sequence: AtomicU64::new(0),
        }
    }

    fn next_path(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| OperationError::OutboxWrite {
            path: self.dir.clone(),
            source,
        })?;
        loop {
            let seq = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;
            let path = self.dir.join(format!("{}-{seq:06}.json", self.prefix));
            if !path.exists() {
                return Ok(path);
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, system: &'static str, payload: &T) -> Result<PathBuf> {
        let content = serde_json::to_string_pretty(payload)
            .map_err(|source| OperationError::PayloadSerialize { system, source })?;
        let path = self.next_path()?;
        fs::write(&path, content).map_err(|source| OperationError::OutboxWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[derive(Debug)]
pub struct OutboxCalculatorClient {
    outbox: Outbox,
}

impl OutboxCalculatorClient {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            outbox: Outbox::new(dir.into(), "definitions"),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.outbox.dir
    }
}

impl CalculatorClient for OutboxCalculatorClient {
    fn push_definitions(&self, definitions: &[CalculatorDefinition]) -> Result<()> {
        let path = self.outbox.write(self.system(), definitions)?;
        info!(
            count = definitions.len(),
            path = %path.display(),
            "queued definitions for stats calculator"
        );
        Ok(())
    }
}

#[derive(Debug)]
pub struct OutboxAugmentationClient {
    outbox: Outbox,
}

impl OutboxAugmentationClient {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            outbox: Outbox::new(dir.into(), "augmentations"),
        }
    }
}

impl AugmentationClient for OutboxAugmentationClient {
    fn push_augmentations(&self, rules: &[AugmentationRule]) -> Result<()> {
        let path = self.outbox.write(self.system(), rules)?;
        info!(
            count = rules.len(),
            path = %path.display(),
            "queued augmentations for augmentation service"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn definition(id: &str) -> CalculatorDefinition {
        CalculatorDefinition {
            id: id.to_string(),
            name: id.to_string(),
            expression: "sum(x)".to_string(),
            reliability_threshold: 1.0,
        }
    }

    #[test]
    fn payloads_are_numbered_in_push_order() {
        let dir = TempDir::new().expect("create temp dir");
        let client = OutboxCalculatorClient::new(dir.path().join("outbox"));

        client.push_definitions(&[definition("a")]).expect("first push");
        client.push_definitions(&[definition("b")]).expect("second push");

        let first = fs::read_to_string(client.dir().join("definitions-000001.json"))
            .expect("first payload");
        let second: Vec<CalculatorDefinition> = serde_json::from_str(
            &fs::read_to_string(client.dir().join("definitions-000002.json"))
                .expect("second payload"),
        )
        .expect("parse payload");

        assert!(first.contains("\"a\""));
        assert_eq!(second, vec![definition("b")]);
    }

    #[test]
    fn existing_payloads_are_not_overwritten() {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(dir.path().join("augmentations-000001.json"), "[]").expect("seed");
        let client = OutboxAugmentationClient::new(dir.path());

        client.push_augmentations(&[]).expect("push");

        assert!(dir.path().join("augmentations-000002.json").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("augmentations-000001.json")).expect("seed"),
            "[]"
        );
    }

    #[test]
    fn unwritable_outbox_is_an_error() {
        let dir = TempDir::new().expect("create temp dir");
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").expect("create file");
        let client = OutboxCalculatorClient::new(&blocker);

        let err = client
            .push_definitions(&[definition("a")])
            .expect_err("directory is a file");

        assert!(matches!(err, OperationError::OutboxWrite { .. }));
    }
}
