//! JSON file implementation of the `ConfigStore` port.
//!
//! Settings live in a pretty-printed JSON file with camelCase keys. Every
//! save also regenerates `server.properties` in the server directory, which
//! is what the dedicated server actually reads at launch.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mineserver_core::{
    ConfigStore, RepositoryError, ServerSettings, properties_path, validate_settings,
};
use tokio::fs;
use tracing::{debug, info, warn};

/// Settings store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    settings_path: PathBuf,
    server_dir: PathBuf,
}

impl JsonConfigStore {
    /// Create a store for explicit locations.
    pub fn new(settings_path: impl Into<PathBuf>, server_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            server_dir: server_dir.into(),
        }
    }

    /// Location of the JSON settings file.
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Location of the generated `server.properties`.
    pub fn properties_path(&self) -> PathBuf {
        properties_path(&self.server_dir)
    }

    async fn write_defaults(&self) -> Result<ServerSettings, RepositoryError> {
        let defaults = ServerSettings::default();
        self.save(&defaults).await?;
        Ok(defaults)
    }

    /// Move an unreadable settings file aside so it is not silently lost.
    async fn back_up_corrupt_file(&self) {
        let backup = self.settings_path.with_extension("json.bak");
        match fs::rename(&self.settings_path, &backup).await {
            Ok(()) => warn!(backup = %backup.display(), "Backed up unreadable settings file"),
            Err(e) => warn!(error = %e, "Failed to back up unreadable settings file"),
        }
    }
}

#[async_trait]
impl ConfigStore for JsonConfigStore {
    async fn load(&self) -> Result<ServerSettings, RepositoryError> {
        let content = match fs::read_to_string(&self.settings_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.settings_path.display(), "No settings file, writing defaults");
                return self.write_defaults().await;
            }
            Err(e) => return Err(storage_error(&self.settings_path, &e)),
        };

        match ServerSettings::from_json_str(&content) {
            Ok(settings) => {
                debug!(path = %self.settings_path.display(), "Loaded settings");
                Ok(settings)
            }
            Err(e) => {
                warn!(
                    path = %self.settings_path.display(),
                    error = %e,
                    "Settings file is not valid, resetting to defaults"
                );
                self.back_up_corrupt_file().await;
                self.write_defaults().await
            }
        }
    }

    async fn save(&self, settings: &ServerSettings) -> Result<(), RepositoryError> {
        validate_settings(settings)?;

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        write_atomic(&self.settings_path, json.as_bytes()).await?;

        let properties = self.properties_path();
        write_atomic(&properties, settings.to_properties().as_bytes()).await?;

        debug!(
            settings = %self.settings_path.display(),
            properties = %properties.display(),
            "Saved settings"
        );
        Ok(())
    }
}

/// Write via a sibling temp file and rename, creating parent directories.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| storage_error(parent, &e))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, contents)
        .await
        .map_err(|e| storage_error(&temp_path, &e))?;
    fs::rename(&temp_path, path)
        .await
        .map_err(|e| storage_error(path, &e))?;
    Ok(())
}

fn storage_error(path: &Path, err: &io::Error) -> RepositoryError {
    RepositoryError::Storage(format!("{}: {err}", path.display()))
}
