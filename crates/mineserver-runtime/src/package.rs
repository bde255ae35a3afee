//! Local server installation check.

use std::path::{Path, PathBuf};

use mineserver_core::PackageProvider;

/// Server distribution unpacked on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalServerPackage {
    executable: PathBuf,
}

impl LocalServerPackage {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl PackageProvider for LocalServerPackage {
    fn is_installed(&self) -> bool {
        self.executable.is_file()
    }

    fn location(&self) -> &Path {
        &self.executable
    }
}
