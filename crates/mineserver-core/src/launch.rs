//! Resolved launch parameters for the server binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Everything the supervisor needs to spawn the server.
///
/// Gameplay settings never reach this type; they are written to
/// `server.properties` before launch and read by the server itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Absolute path to the server executable.
    pub executable: PathBuf,
    /// Arguments passed verbatim (no shell). Empty for the dedicated server.
    pub args: Vec<OsString>,
    /// Working directory for the child process.
    pub working_dir: PathBuf,
}

impl LaunchSpec {
    /// Create a launch spec with no arguments.
    pub fn new(executable: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    /// Append arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// File name of the executable, as it appears in the OS process table.
    pub fn executable_name(&self) -> Option<String> {
        executable_name(&self.executable)
    }
}

fn executable_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_name() {
        let spec = LaunchSpec::new("/srv/bedrock/bedrock_server", "/srv/bedrock");
        assert_eq!(spec.executable_name().as_deref(), Some("bedrock_server"));
        assert!(spec.args.is_empty());
    }

    #[test]
    fn test_with_args() {
        let spec = LaunchSpec::new("/bin/sh", "/tmp").with_args(["-c", "exit 0"]);
        assert_eq!(spec.args, vec![OsString::from("-c"), OsString::from("exit 0")]);
    }

    #[test]
    fn test_executable_name_missing() {
        let spec = LaunchSpec::new("/", "/");
        assert_eq!(spec.executable_name(), None);
    }
}
