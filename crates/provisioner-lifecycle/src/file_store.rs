use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{LifecycleError, Result};
use crate::record::{LifecycleRecord, NewLifecycleRecord};
use crate::store::LifecycleStore;

/// On-disk layout of the lifecycle history.
/// Format:
/// ```toml
/// [[record]]
/// id = 1
/// provisioning_start_time = "2026-01-01T00:00:00Z"
/// state = "STARTED"
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
struct LifecycleHistory {
    #[serde(default, rename = "record")]
    records: Vec<LifecycleRecord>,
}

/// Lifecycle store backed by a TOML file, so state survives restarts.
///
/// Writes from this process are serialized; the file is assumed to have a
/// single writing process. Each save writes a sibling temp file and renames
/// it over the history, so a crash never leaves a truncated file behind.
#[derive(Debug)]
pub struct FileLifecycleStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLifecycleStore {
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

    fn load(&self) -> Result<LifecycleHistory> {
        if !self.path.exists() {
            return Ok(LifecycleHistory::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| LifecycleError::StoreRead {
            path: self.path.clone(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| LifecycleError::StoreParse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, history: &LifecycleHistory) -> Result<()> {
        let write_error = |source: std::io::Error| LifecycleError::StoreWrite {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(write_error)?;
                parent
            }
            None => Path::new("."),
        };

        let content =
            toml::to_string_pretty(history).map_err(|source| LifecycleError::StoreSerialize {
                path: self.path.clone(),
                source,
            })?;

        let mut staged = NamedTempFile::new_in(dir).map_err(write_error)?;
        staged.write_all(content.as_bytes()).map_err(write_error)?;
        staged.as_file().sync_all().map_err(write_error)?;
        staged
            .persist(&self.path)
            .map_err(|persist| write_error(persist.error))?;
        Ok(())
    }
}

impl LifecycleStore for FileLifecycleStore {
    fn save(&self, record: NewLifecycleRecord) -> Result<LifecycleRecord> {
        let _guard = self.write_lock.lock().map_err(|_| LifecycleError::Poisoned)?;
        let mut history = self.load()?;
        let id = history.records.iter().map(|r| r.id).max().map_or(1, |id| id + 1);
        let saved = record.into_record(id);
        history.records.push(saved.clone());
        self.write(&history)?;
        Ok(saved)
    }

    fn find_latest(&self) -> Result<Option<LifecycleRecord>> {
        let history = self.load()?;
        Ok(history.records.into_iter().max_by_key(|r| r.id))
    }

    fn history(&self) -> Result<Vec<LifecycleRecord>> {
        let mut records = self.load()?.records;
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::state::ProvisioningState;

    fn setup_test_dir() -> TempDir {
        tempfile::tempdir().expect("failed to create temp dir")
    }

    fn draft(state: ProvisioningState) -> NewLifecycleRecord {
        NewLifecycleRecord::following(&LifecycleRecord::initial(), state, Utc::now())
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = setup_test_dir();
        let store = FileLifecycleStore::new(dir.path().join("state.toml"));

        assert!(store.find_latest().expect("read").is_none());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = setup_test_dir();
        let path = dir.path().join("nested/deeper/state.toml");
        let store = FileLifecycleStore::new(&path);

        store.save(draft(ProvisioningState::Started)).expect("save");

        assert!(path.exists());
    }

    #[test]
    fn records_survive_reopening() {
        let dir = setup_test_dir();
        let path = dir.path().join("state.toml");

        let store = FileLifecycleStore::new(&path);
        store.save(draft(ProvisioningState::Started)).expect("save");
        store
            .save(draft(ProvisioningState::Error).with_cause("boom"))
            .expect("save");

        let reopened = FileLifecycleStore::new(&path);
        let latest = reopened.find_latest().expect("read").expect("has record");

        assert_eq!(latest.id, 2);
        assert_eq!(latest.state, ProvisioningState::Error);
        assert_eq!(latest.cause.as_deref(), Some("boom"));
        assert_eq!(reopened.history().expect("read").len(), 2);
    }

    #[test]
    fn saves_replace_the_file_without_leaving_staging_files() {
        let dir = setup_test_dir();
        let path = dir.path().join("state.toml");
        let store = FileLifecycleStore::new(&path);

        for state in [
            ProvisioningState::Started,
            ProvisioningState::Completed,
            ProvisioningState::Reset,
        ] {
            store.save(draft(state)).expect("save");
        }

        let entries: Vec<_> = fs::read_dir(dir.path())
            .expect("list dir")
            .map(|entry| entry.expect("dir entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("state.toml")]);
        assert_eq!(store.history().expect("read").len(), 3);
    }

    #[test]
    fn unwritable_directory_keeps_the_previous_history() {
        let dir = setup_test_dir();
        let path = dir.path().join("state.toml");
        let store = FileLifecycleStore::new(&path);
        store.save(draft(ProvisioningState::Started)).expect("save");
        let before = fs::read_to_string(&path).expect("read");

        let blocked = FileLifecycleStore::new(path.join("nested.toml"));
        let err = blocked
            .save(draft(ProvisioningState::Completed))
            .expect_err("parent is a file");

        assert!(matches!(err, LifecycleError::StoreWrite { .. }));
        assert_eq!(fs::read_to_string(&path).expect("read"), before);
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = setup_test_dir();
        let path = dir.path().join("state.toml");
        fs::write(&path, "[[record]]\nid = \"not a number\"\n").expect("write");

        let store = FileLifecycleStore::new(&path);
        let err = store.find_latest().expect_err("parse fails");

        assert!(matches!(err, LifecycleError::StoreParse { .. }));
    }
}
