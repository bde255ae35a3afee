//! OS process table scanning for leftover server instances.
//!
//! A leftover is a server process the supervisor holds no handle for,
//! typically from a panel that crashed or was force-quit. Leftovers are
//! identified by executable name only.

mod system;

pub use system::SystemProcessDirectory;

/// Suffix stripped before comparing names, so `bedrock_server.exe` and
/// `bedrock_server` identify the same program.
const EXE_SUFFIX: &str = ".exe";

/// Case-insensitive executable name comparison.
pub(crate) fn name_matches(candidate: &str, wanted: &str) -> bool {
    let candidate = strip_exe_suffix(candidate);
    let wanted = strip_exe_suffix(wanted);
    !wanted.is_empty() && candidate.eq_ignore_ascii_case(wanted)
}

fn strip_exe_suffix(name: &str) -> &str {
    let Some(split) = name.len().checked_sub(EXE_SUFFIX.len()) else {
        return name;
    };
    match name.get(split..) {
        Some(suffix) if suffix.eq_ignore_ascii_case(EXE_SUFFIX) => &name[..split],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches_is_case_insensitive() {
        assert!(name_matches("Bedrock_Server", "bedrock_server"));
        assert!(name_matches("bedrock_server", "BEDROCK_SERVER"));
    }

    #[test]
    fn test_name_matches_ignores_exe_suffix() {
        assert!(name_matches("bedrock_server.exe", "bedrock_server"));
        assert!(name_matches("bedrock_server", "bedrock_server.EXE"));
        assert!(name_matches("bedrock_server.exe", "bedrock_server.exe"));
    }

    #[test]
    fn test_name_matches_rejects_other_programs() {
        assert!(!name_matches("bedrock_server2", "bedrock_server"));
        assert!(!name_matches("java", "bedrock_server"));
        assert!(!name_matches("anything", ""));
        assert!(!name_matches(".exe", ".exe"));
    }

    #[test]
    fn test_strip_handles_multibyte_names() {
        assert_eq!(strip_exe_suffix("é"), "é");
        assert_eq!(strip_exe_suffix("serveré.exe"), "serveré");
    }
}
