//! Server installation layout under the data root.

use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::{data_root, non_empty_env};

/// Environment variable overriding the server executable location.
const SERVER_EXE_ENV: &str = "MINESERVER_SERVER_EXE";

/// File name of the dedicated server binary on this platform.
#[cfg(windows)]
pub const SERVER_EXECUTABLE_NAME: &str = "bedrock_server.exe";
/// File name of the dedicated server binary on this platform.
#[cfg(not(windows))]
pub const SERVER_EXECUTABLE_NAME: &str = "bedrock_server";

const SERVER_DIR_NAME: &str = "bedrock-server";
const SETTINGS_FILE_NAME: &str = "server-config.json";
const PROPERTIES_FILE_NAME: &str = "server.properties";

/// Directory the server distribution is unpacked into.
pub fn server_dir() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(SERVER_DIR_NAME))
}

/// Path to the server executable.
///
/// `MINESERVER_SERVER_EXE` takes precedence over the installed location.
pub fn server_executable_path() -> Result<PathBuf, PathError> {
    if let Some(path) = non_empty_env(SERVER_EXE_ENV)? {
        return Ok(path);
    }
    Ok(executable_in(&server_dir()?))
}

/// Path to the JSON settings file.
pub fn settings_file_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(SETTINGS_FILE_NAME))
}

/// Path to the generated `server.properties` inside a server directory.
pub fn properties_path(server_dir: &Path) -> PathBuf {
    server_dir.join(PROPERTIES_FILE_NAME)
}

fn executable_in(server_dir: &Path) -> PathBuf {
    server_dir.join(SERVER_EXECUTABLE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_relative_to_server_dir() {
        let dir = Path::new("/data/bedrock-server");
        assert_eq!(
            properties_path(dir),
            PathBuf::from("/data/bedrock-server/server.properties")
        );
        assert!(executable_in(dir).ends_with(SERVER_EXECUTABLE_NAME));
    }

    #[test]
    fn test_executable_name_matches_platform() {
        if cfg!(windows) {
            assert!(SERVER_EXECUTABLE_NAME.ends_with(".exe"));
        } else {
            assert!(!SERVER_EXECUTABLE_NAME.contains('.'));
        }
    }
}
