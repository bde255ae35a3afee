//! Process runtime for the mineserver control panel.
//!
//! Owns everything that touches the OS: spawning the dedicated server,
//! relaying its console, scanning the process table for leftovers,
//! killing process trees and persisting settings to disk.

#![deny(unsafe_code)]

pub mod package;
pub mod process;
pub mod scanner;
pub mod store;
mod supervisor;

// Re-export the supervisor and its configuration
pub use supervisor::{
    LEFTOVER_SETTLE_DELAY, RESTART_DELAY, STALE_HANDLE_SETTLE_DELAY, STOP_COMMAND,
    STOP_ESCALATION_TIMEOUT, ServerSupervisor, StopOutcome, SupervisorError, SupervisorOptions,
    SupervisorTimings,
};

// Re-export process primitives
pub use process::{EventRelay, HandleError, ManagedProcess, ProcessEvent, ProcessExit};

// Re-export adapter implementations of core ports
pub use package::LocalServerPackage;
pub use scanner::SystemProcessDirectory;
pub use store::JsonConfigStore;
