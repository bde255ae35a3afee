//! OS process table port.
//!
//! The supervisor uses this to find server instances it does not hold a
//! handle to (leftovers from a crashed or force-quit panel) and to kill
//! them by PID alone.

use async_trait::async_trait;

/// Result of a kill-by-PID request.
///
/// Both variants are success: a leftover that vanished on its own is the
/// common case, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// The process (and its descendants) were signalled.
    Killed,
    /// No such process existed.
    AlreadyGone,
}

/// Query and control access to the OS-wide process list.
#[async_trait]
pub trait ProcessDirectory: Send + Sync {
    /// All live processes whose executable name matches `name`
    /// (case-insensitive), in the order the OS reports them.
    async fn find_all_by_executable_name(&self, name: &str) -> Vec<u32>;

    /// First live process matching `name`, if any.
    async fn find_by_executable_name(&self, name: &str) -> Option<u32> {
        self.find_all_by_executable_name(name).await.into_iter().next()
    }

    /// Force-kill a process and its descendants by PID.
    ///
    /// Never fails; OS errors are treated as "already gone".
    async fn kill_by_pid(&self, pid: u32) -> KillOutcome;
}
