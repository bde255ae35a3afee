//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No process handles or OS types in any signature
//! - Scanner and kill operations never fail: "gone" is a normal outcome
//! - Settings persistence works with the domain `ServerSettings` directly

pub mod config_store;
pub mod package_provider;
pub mod process_directory;

use thiserror::Error;

pub use config_store::ConfigStore;
pub use package_provider::PackageProvider;
pub use process_directory::{KillOutcome, ProcessDirectory};

/// Domain-specific errors for persistence operations.
///
/// Abstracts away storage details (file I/O, JSON) so callers can handle
/// persistence failures without knowing the backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storage backend error (filesystem, permissions, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The stored value was rejected by validation.
    #[error(transparent)]
    Invalid(#[from] crate::settings::SettingsError),
}
