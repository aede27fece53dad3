use std::fs;
use std::path::Path;

use crate::Result;
use crate::error::OperationError;
use crate::types::ProvisioningWork;

/// Load a TOML work file describing what to provision.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_work_file(path: &Path) -> Result<ProvisioningWork> {
    let content = fs::read_to_string(path).map_err(|source| OperationError::WorkFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| OperationError::WorkFileParse {
        path: path.to_path_buf(),
        source,
    })
}
