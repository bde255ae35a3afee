//! Server lifecycle and console events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observable server status.
///
/// `Stopped` means no server process is known to be alive, tracked or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// No server process is alive.
    Stopped,
    /// The supervisor holds a live server process.
    Running,
}

impl ServerStatus {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Origin of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    /// Server standard output.
    Stdout,
    /// Server standard error.
    Stderr,
    /// Line produced by the supervisor itself (exit codes, cleanup notices).
    Panel,
}

impl LogStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Panel => "panel",
        }
    }
}

/// A single console line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerLogEntry {
    /// When the line was received.
    pub timestamp: DateTime<Utc>,
    /// Which stream produced the line.
    pub stream: LogStream,
    /// Line content without the trailing newline.
    pub line: String,
}

impl ServerLogEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(stream: LogStream, line: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            stream,
            line: line.into(),
        }
    }

    /// Create a supervisor-originated entry.
    pub fn panel(line: impl Into<String>) -> Self {
        Self::new(LogStream::Panel, line)
    }
}

/// Event payload pushed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The server status changed.
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        status: ServerStatus,
        /// Process ID of the server when running.
        #[serde(skip_serializing_if = "Option::is_none")]
        pid: Option<u32>,
        updated_at: DateTime<Utc>,
    },

    /// A console line was produced.
    Log(ServerLogEntry),
}

impl ServerEvent {
    /// Create a running event for a freshly spawned server.
    pub fn running(pid: u32) -> Self {
        Self::StatusChanged {
            status: ServerStatus::Running,
            pid: Some(pid),
            updated_at: Utc::now(),
        }
    }

    /// Create a stopped event.
    pub fn stopped() -> Self {
        Self::StatusChanged {
            status: ServerStatus::Stopped,
            pid: None,
            updated_at: Utc::now(),
        }
    }

    /// Create a log event.
    pub fn log(stream: LogStream, line: impl Into<String>) -> Self {
        Self::Log(ServerLogEntry::new(stream, line))
    }

    /// Status carried by this event, if it is a status change.
    pub const fn status(&self) -> Option<ServerStatus> {
        match self {
            Self::StatusChanged { status, .. } => Some(*status),
            Self::Log(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_event_serialization() {
        let event = ServerEvent::running(4242);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"statusChanged\""));
        assert!(json.contains("\"status\":\"running\""));
        assert!(json.contains("\"pid\":4242"));
        assert!(json.contains("\"updatedAt\""));
    }

    #[test]
    fn test_stopped_event_omits_pid() {
        let json = serde_json::to_string(&ServerEvent::stopped()).unwrap();
        assert!(json.contains("\"status\":\"stopped\""));
        assert!(!json.contains("pid"));
    }

    #[test]
    fn test_log_event_serialization() {
        let event = ServerEvent::log(LogStream::Stderr, "boom");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"log\""));
        assert!(json.contains("\"stream\":\"stderr\""));
        assert!(json.contains("\"line\":\"boom\""));
        assert_eq!(event.status(), None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ServerStatus::Running.to_string(), "running");
        assert_eq!(ServerStatus::Stopped.to_string(), "stopped");
        assert!(ServerStatus::Running.is_running());
    }
}
