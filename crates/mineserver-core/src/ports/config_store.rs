//! Settings persistence port.

use async_trait::async_trait;

use super::RepositoryError;
use crate::settings::ServerSettings;

/// Store for the server settings.
///
/// Implementations own both the structured settings file and its
/// translation into the server's native property file.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the settings.
    ///
    /// Returns (and persists) defaults when nothing usable is stored.
    async fn load(&self) -> Result<ServerSettings, RepositoryError>;

    /// Validate and save the settings, regenerating the property file.
    async fn save(&self, settings: &ServerSettings) -> Result<(), RepositoryError>;
}
