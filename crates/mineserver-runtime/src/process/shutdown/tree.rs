//! Process tree walking and killing.

use std::collections::HashMap;

use mineserver_core::KillOutcome;
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind};
use tracing::{debug, warn};

/// Snapshot the OS process table.
///
/// Executable paths are loaded so callers can match on them.
pub(crate) fn refresh_process_table() -> System {
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
    );
    sys
}

/// Force-kill `pid` and every descendant, children first.
///
/// Descendants that started before the root are skipped: they can only be
/// there because the root PID was reused.
///
/// This is a blocking operation; call it from `spawn_blocking` in async code.
pub fn kill_tree(pid: u32) -> KillOutcome {
    let sys = refresh_process_table();
    let root_pid = Pid::from_u32(pid);

    let Some(root) = sys.process(root_pid) else {
        debug!(pid = %pid, "Process already gone");
        return KillOutcome::AlreadyGone;
    };
    if root.status() == ProcessStatus::Zombie {
        debug!(pid = %pid, "Process already exited (zombie)");
        return KillOutcome::AlreadyGone;
    }

    let root_start_time = root.start_time();
    let parents = build_parent_map(&sys);

    let mut descendants = Vec::new();
    collect_descendants(&parents, root_pid, &mut descendants);

    for child in descendants {
        let Some(process) = sys.process(child) else {
            continue;
        };
        if process.start_time() < root_start_time {
            debug!(pid = %child, root = %pid, "Skipping process that predates the root");
            continue;
        }
        send_kill(&sys, child);
    }

    send_kill(&sys, root_pid);
    KillOutcome::Killed
}

fn build_parent_map(sys: &System) -> HashMap<Pid, Vec<Pid>> {
    let mut parents: HashMap<Pid, Vec<Pid>> = HashMap::new();
    for (pid, process) in sys.processes() {
        if process.thread_kind().is_some() {
            continue;
        }
        if let Some(parent) = process.parent() {
            parents.entry(parent).or_default().push(*pid);
        }
    }
    parents
}

/// Depth-first, post-order: grandchildren precede their parents.
fn collect_descendants(parents: &HashMap<Pid, Vec<Pid>>, pid: Pid, out: &mut Vec<Pid>) {
    if let Some(children) = parents.get(&pid) {
        for child in children {
            collect_descendants(parents, *child, out);
            out.push(*child);
        }
    }
}

#[cfg(unix)]
fn send_kill(_sys: &System, pid: Pid) {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};

    let Ok(raw) = i32::try_from(pid.as_u32()) else {
        return;
    };

    match signal::kill(nix::unistd::Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!(pid = %pid, "Sent SIGKILL"),
        Err(Errno::ESRCH) => debug!(pid = %pid, "Process exited before SIGKILL"),
        Err(e) => warn!(pid = %pid, error = %e, "Failed to kill process"),
    }
}

#[cfg(not(unix))]
fn send_kill(sys: &System, pid: Pid) {
    let Some(process) = sys.process(pid) else {
        return;
    };
    let killed = process
        .kill_with(sysinfo::Signal::Kill)
        .unwrap_or_else(|| process.kill());
    if killed {
        debug!(pid = %pid, "Killed process");
    } else {
        warn!(pid = %pid, "Failed to kill process");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_tree_reports_missing_pid_as_gone() {
        assert_eq!(kill_tree(999_999_999), KillOutcome::AlreadyGone);
    }

    #[test]
    fn descendants_are_post_order() {
        let mut parents = HashMap::new();
        parents.insert(Pid::from_u32(1), vec![Pid::from_u32(2), Pid::from_u32(3)]);
        parents.insert(Pid::from_u32(2), vec![Pid::from_u32(4)]);

        let mut out = Vec::new();
        collect_descendants(&parents, Pid::from_u32(1), &mut out);

        assert_eq!(
            out,
            vec![Pid::from_u32(4), Pid::from_u32(2), Pid::from_u32(3)]
        );
    }
}
