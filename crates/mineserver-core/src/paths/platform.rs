//! Platform-specific data root resolution.

use std::env;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::error::PathError;

/// Environment variable overriding the data root.
pub(super) const DATA_DIR_ENV: &str = "MINESERVER_DATA_DIR";

/// Get the root directory for application data (settings, server install).
///
/// Resolution order:
/// 1. `MINESERVER_DATA_DIR` environment variable (highest priority)
/// 2. System local data directory (e.g., `~/.local/share/mineserver`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Some(path) = non_empty_env(DATA_DIR_ENV)? {
        return Ok(path);
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    let root = data_dir.join("mineserver");

    if !root.exists() {
        debug!(path = %root.display(), "Creating data root");
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

/// Read a path override from the environment, rejecting empty values.
pub(super) fn non_empty_env(name: &'static str) -> Result<Option<PathBuf>, PathError> {
    match env::var_os(name) {
        None => Ok(None),
        Some(value) if value.is_empty() => Err(PathError::EmptyOverride(name)),
        Some(value) => Ok(Some(PathBuf::from(value))),
    }
}
