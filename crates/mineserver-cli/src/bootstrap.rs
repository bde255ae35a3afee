//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Settings store (JSON file + `server.properties`)
//! - Local package check for the server executable
//! - Process supervisor scanning the real OS process table

use std::path::PathBuf;
use std::sync::Arc;

use mineserver_core::{
    LaunchSpec, PackageProvider, data_root, server_dir, server_executable_path,
    settings_file_path,
};
use mineserver_runtime::{
    JsonConfigStore, LocalServerPackage, ServerSupervisor, SupervisorOptions,
    SystemProcessDirectory,
};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Root of all panel data.
    pub data_root: PathBuf,
    /// Directory the server runs in.
    pub server_dir: PathBuf,
    /// Path to the server executable.
    pub executable: PathBuf,
    /// Path to the JSON settings file.
    pub settings_path: PathBuf,
}

impl CliConfig {
    /// Create config with default paths.
    pub fn with_defaults() -> Result<Self, CliError> {
        Ok(Self {
            data_root: data_root()?,
            server_dir: server_dir()?,
            executable: server_executable_path()?,
            settings_path: settings_file_path()?,
        })
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub config: CliConfig,
    pub store: JsonConfigStore,
    pub package: Arc<LocalServerPackage>,
    pub supervisor: ServerSupervisor,
}

impl CliContext {
    /// Whether the server executable is present.
    pub fn is_installed(&self) -> bool {
        self.package.is_installed()
    }
}

/// Bootstrap the CLI application.
pub fn bootstrap(config: CliConfig) -> CliContext {
    let store = JsonConfigStore::new(&config.settings_path, &config.server_dir);
    let package = Arc::new(LocalServerPackage::new(&config.executable));

    let launch = LaunchSpec::new(&config.executable, &config.server_dir);
    let supervisor = ServerSupervisor::with_options(
        launch,
        Arc::new(SystemProcessDirectory::new()),
        SupervisorOptions {
            package: Some(package.clone() as Arc<dyn PackageProvider>),
            ..SupervisorOptions::default()
        },
    );

    CliContext {
        config,
        store,
        package,
        supervisor,
    }
}
