//! Events produced by a single managed process.

use std::fmt;

use mineserver_core::LogStream;

/// How a managed process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{code}"),
            None => write!(f, "null"),
        }
    }
}

/// Event emitted by a `ManagedProcess`.
///
/// Every line is reported as an `Output`; `Exited` is sent exactly once and
/// always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A line of console output, without its newline.
    Output { stream: LogStream, line: String },
    /// The process has exited and been reaped.
    Exited(ProcessExit),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_display() {
        assert_eq!(ProcessExit { code: Some(0) }.to_string(), "0");
        assert_eq!(ProcessExit { code: None }.to_string(), "null");
    }
}
