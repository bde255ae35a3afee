//! Server distribution port.

use std::path::Path;

/// Provider of the installed server distribution.
///
/// The supervisor only asks whether the server is installed before starting
/// it; fetching and unpacking a distribution happens elsewhere.
pub trait PackageProvider: Send + Sync {
    /// Whether the server executable is present and ready to launch.
    fn is_installed(&self) -> bool;

    /// Location checked by `is_installed`, for error messages.
    fn location(&self) -> &Path;
}
