//! Core domain types and port definitions for the mineserver control panel.
//!
//! This crate holds everything the runtime and the adapters agree on:
//! the server settings model, lifecycle events, path resolution and the
//! port traits that abstract the OS process table, the package location
//! and settings persistence. It contains no process spawning code.

#![deny(unused_crate_dependencies)]

pub mod events;
pub mod launch;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use events::{LogStream, ServerEvent, ServerLogEntry, ServerStatus};
pub use launch::LaunchSpec;
pub use ports::{
    ConfigStore, KillOutcome, PackageProvider, ProcessDirectory, RepositoryError,
};
pub use settings::{
    DEFAULT_SERVER_PORT, DEFAULT_SERVER_PORT_V6, Difficulty, GameMode, MovementAuthority,
    PermissionLevel, ServerSettings, SettingsError, validate_settings,
};

// Re-export path utilities
pub use paths::{
    PathError, SERVER_EXECUTABLE_NAME, data_root, properties_path, server_dir,
    server_executable_path, settings_file_path,
};
