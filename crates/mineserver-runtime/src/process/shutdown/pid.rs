//! Kill and wait on processes by PID alone (no `Child` handle available).

use std::time::Duration;

use mineserver_core::KillOutcome;
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use super::tree::kill_tree;

/// How long `kill_pid` waits for the killed process to disappear.
const EXIT_WAIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll interval while waiting for a process to disappear.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Check whether `pid` refers to a live (non-zombie) process.
pub fn is_alive(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    sys.process(pid)
        .is_some_and(|process| process.status() != ProcessStatus::Zombie)
}

/// Wait until `pid` is no longer alive.
///
/// Returns `false` if it was still alive when `timeout` elapsed.
pub async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        let alive = tokio::task::spawn_blocking(move || is_alive(pid))
            .await
            .unwrap_or(false);
        if !alive {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(EXIT_POLL_INTERVAL).await;
    }
}

/// Force-kill a process tree by PID and wait for the root to disappear.
///
/// # Differences from `ManagedProcess::terminate_tree`
/// - No `Child` handle, so **cannot reap** the process
/// - Used for leftovers from previous panel sessions
///
/// Never fails: a missing process is reported as `AlreadyGone`, and a
/// process that survives the wait is logged and reported as `Killed`.
pub async fn kill_pid(pid: u32) -> KillOutcome {
    let outcome = tokio::task::spawn_blocking(move || kill_tree(pid))
        .await
        .unwrap_or_else(|e| {
            warn!(pid = %pid, error = %e, "Kill task failed");
            KillOutcome::AlreadyGone
        });

    if outcome == KillOutcome::Killed && !wait_for_exit(pid, EXIT_WAIT_TIMEOUT).await {
        warn!(pid = %pid, "Process still present after SIGKILL");
    }

    debug!(pid = %pid, ?outcome, "kill_pid finished");
    outcome
}
