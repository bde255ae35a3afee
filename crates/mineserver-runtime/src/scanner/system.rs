//! `ProcessDirectory` backed by the live OS process table.

use async_trait::async_trait;
use mineserver_core::{KillOutcome, ProcessDirectory};
use sysinfo::{ProcessStatus, System};
use tracing::{debug, warn};

use super::name_matches;
use crate::process::shutdown::{kill_pid, refresh_process_table};

/// Process directory reading the real process table through `sysinfo`.
///
/// Scans exclude the panel's own process, zombies and (on Linux) thread
/// entries, and return PIDs in ascending order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessDirectory;

impl SystemProcessDirectory {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessDirectory for SystemProcessDirectory {
    async fn find_all_by_executable_name(&self, name: &str) -> Vec<u32> {
        let wanted = name.to_owned();
        match tokio::task::spawn_blocking(move || scan(&wanted)).await {
            Ok(pids) => pids,
            Err(e) => {
                warn!(error = %e, "Process scan task failed");
                Vec::new()
            }
        }
    }

    async fn kill_by_pid(&self, pid: u32) -> KillOutcome {
        kill_pid(pid).await
    }
}

fn scan(wanted: &str) -> Vec<u32> {
    let sys = refresh_process_table();
    let own_pid = std::process::id();

    let mut pids = matching_pids(&sys, wanted, own_pid);
    pids.sort_unstable();
    debug!(name = %wanted, count = pids.len(), "Scanned process table");
    pids
}

fn matching_pids(sys: &System, wanted: &str, own_pid: u32) -> Vec<u32> {
    sys.processes()
        .iter()
        .filter(|(_, process)| process.thread_kind().is_none())
        .filter(|(_, process)| process.status() != ProcessStatus::Zombie)
        .filter(|(pid, _)| pid.as_u32() != own_pid)
        .filter(|(_, process)| {
            let by_name = name_matches(&process.name().to_string_lossy(), wanted);
            let by_exe = process
                .exe()
                .and_then(|exe| exe.file_name())
                .is_some_and(|file| name_matches(&file.to_string_lossy(), wanted));
            by_name || by_exe
        })
        .map(|(pid, _)| pid.as_u32())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_name_finds_nothing() {
        let directory = SystemProcessDirectory::new();
        let pids = directory
            .find_all_by_executable_name("mineserver-no-such-program")
            .await;
        assert!(pids.is_empty());
        assert_eq!(
            directory
                .find_by_executable_name("mineserver-no-such-program")
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_scan_excludes_own_process() {
        let own_name = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap();

        let pids = SystemProcessDirectory::new()
            .find_all_by_executable_name(&own_name)
            .await;
        assert!(!pids.contains(&std::process::id()));
    }

    #[tokio::test]
    async fn test_kill_missing_pid_is_already_gone() {
        let outcome = SystemProcessDirectory::new().kill_by_pid(999_999_999).await;
        assert_eq!(outcome, KillOutcome::AlreadyGone);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_finds_spawned_child_and_kill_removes_it() {
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();

        let directory = SystemProcessDirectory::new();
        let found = directory.find_all_by_executable_name("sleep").await;
        assert!(found.contains(&pid));

        assert_eq!(directory.kill_by_pid(pid).await, KillOutcome::Killed);
        let _ = child.wait().await;

        let after = directory.find_all_by_executable_name("sleep").await;
        assert!(!after.contains(&pid));
    }
}
