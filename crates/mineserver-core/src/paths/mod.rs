//! Path utilities for mineserver data directories.
//!
//! This module provides the canonical path resolution for all components:
//! - Application data root
//! - Server installation directory and executable
//! - Settings file and generated `server.properties`
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - OS-specific logic is kept private in `platform`

mod error;
mod platform;
mod server;

// Error type
pub use error::PathError;

// Data root
pub use platform::data_root;

// Server installation layout
pub use server::{
    SERVER_EXECUTABLE_NAME, properties_path, server_dir, server_executable_path,
    settings_file_path,
};
