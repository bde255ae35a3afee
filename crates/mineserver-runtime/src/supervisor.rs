//! Supervisor for the dedicated server process lifecycle.
//!
//! The `ServerSupervisor` owns at most one `ManagedProcess` internally.
//! Adapters (CLI, UI) call methods on the supervisor without ever holding
//! the handle themselves.
//!
//! Every entry point re-derives the truth from the OS before acting:
//! - **Leftover reconciliation**: a server instance without a handle (from a
//!   crashed or force-quit panel) is killed by PID before start, on stop and
//!   on status.
//! - **Generation gating**: each spawned handle gets a generation number; the
//!   exit watcher and the stop escalation only remove the handle they were
//!   created for, so a late timer can never kill a newer server.
//! - **Serialized requests**: start, stop, status and shutdown run one at a
//!   time. The slot lock itself is never held across a sleep, so console
//!   output keeps flowing during settle delays.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use mineserver_core::{
    LaunchSpec, LogStream, PackageProvider, ProcessDirectory, SERVER_EXECUTABLE_NAME,
    ServerEvent, ServerStatus,
};
use tokio::sync::{Mutex, broadcast};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::process::{EventRelay, HandleError, ManagedProcess, ProcessEvent, ProcessEvents};

/// Wait after killing a leftover instance so the OS releases its ports.
pub const LEFTOVER_SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Wait after discarding a stale handle before spawning a new server.
pub const STALE_HANDLE_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Time the server gets to honour `stop` before it is force-killed.
pub const STOP_ESCALATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Pause between the stop and the start of a restart.
pub const RESTART_DELAY: Duration = Duration::from_secs(3);

/// Console command requesting a graceful shutdown.
pub const STOP_COMMAND: &str = "stop";

/// Delays used by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorTimings {
    pub leftover_settle: Duration,
    pub stale_settle: Duration,
    pub stop_timeout: Duration,
    pub restart_delay: Duration,
}

impl Default for SupervisorTimings {
    fn default() -> Self {
        Self {
            leftover_settle: LEFTOVER_SETTLE_DELAY,
            stale_settle: STALE_HANDLE_SETTLE_DELAY,
            stop_timeout: STOP_ESCALATION_TIMEOUT,
            restart_delay: RESTART_DELAY,
        }
    }
}

impl SupervisorTimings {
    #[must_use]
    pub const fn with_leftover_settle(mut self, delay: Duration) -> Self {
        self.leftover_settle = delay;
        self
    }

    #[must_use]
    pub const fn with_stale_settle(mut self, delay: Duration) -> Self {
        self.stale_settle = delay;
        self
    }

    #[must_use]
    pub const fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }
}

/// Optional supervisor collaborators and tuning.
#[derive(Clone, Default)]
pub struct SupervisorOptions {
    pub timings: SupervisorTimings,
    /// Checked before every start when present.
    pub package: Option<Arc<dyn PackageProvider>>,
}

/// Error from supervisor operations.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The server executable is missing.
    #[error("Server is not installed at {}", .0.display())]
    NotInstalled(PathBuf),

    /// The server process could not be spawned.
    #[error(transparent)]
    Spawn(HandleError),

    /// A live server process is still tracked.
    #[error("Server is already running (PID {0})")]
    AlreadyRunning(u32),

    /// Neither a tracked nor a leftover server process exists.
    #[error("Server is not running")]
    NotRunning,

    /// The server input stream is closed.
    #[error("Server input stream is closed")]
    PipeClosed,
}

/// How a stop request was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// `stop` was written; the server is expected to exit on its own and is
    /// force-killed if it is still alive after the stop timeout.
    GracefulRequested { pid: u32 },
    /// The server input was closed, so the process tree was killed at once.
    Forced { pid: u32 },
    /// No tracked server; an untracked leftover instance was killed.
    LeftoverKilled { pid: u32 },
}

/// The tracked handle together with the generation it was spawned as.
#[derive(Clone)]
struct Tracked {
    generation: u64,
    process: Arc<ManagedProcess>,
}

struct Inner {
    launch: LaunchSpec,
    executable_name: String,
    directory: Arc<dyn ProcessDirectory>,
    package: Option<Arc<dyn PackageProvider>>,
    relay: Arc<EventRelay>,
    timings: SupervisorTimings,
    slot: Mutex<Option<Tracked>>,
    operations: Mutex<()>,
    generations: AtomicU64,
    forced_kills: AtomicU64,
}

/// Lifecycle state machine for the single dedicated server process.
///
/// Cheap to clone; clones share the same tracked process.
///
/// # Example
///
/// ```ignore
/// let supervisor = ServerSupervisor::new(launch, Arc::new(SystemProcessDirectory::new()));
/// let mut events = supervisor.subscribe();
/// let pid = supervisor.start().await?;
/// supervisor.send_command("list").await?;
/// supervisor.stop().await?;
/// ```
#[derive(Clone)]
pub struct ServerSupervisor {
    inner: Arc<Inner>,
}

impl ServerSupervisor {
    /// Create a supervisor with default timings and no install check.
    pub fn new(launch: LaunchSpec, directory: Arc<dyn ProcessDirectory>) -> Self {
        Self::with_options(launch, directory, SupervisorOptions::default())
    }

    /// Create a supervisor with explicit options.
    pub fn with_options(
        launch: LaunchSpec,
        directory: Arc<dyn ProcessDirectory>,
        options: SupervisorOptions,
    ) -> Self {
        let executable_name = launch
            .executable_name()
            .unwrap_or_else(|| SERVER_EXECUTABLE_NAME.to_string());

        Self {
            inner: Arc::new(Inner {
                launch,
                executable_name,
                directory,
                package: options.package,
                relay: Arc::new(EventRelay::new()),
                timings: options.timings,
                slot: Mutex::new(None),
                operations: Mutex::new(()),
                generations: AtomicU64::new(0),
                forced_kills: AtomicU64::new(0),
            }),
        }
    }

    /// Start the server.
    ///
    /// Kills any leftover instance, discards a stale handle, then spawns a
    /// fresh process and returns its PID without waiting for readiness.
    pub async fn start(&self) -> Result<u32, SupervisorError> {
        let _operation = self.inner.operations.lock().await;
        self.inner.start_locked().await
    }

    /// Request a server stop.
    ///
    /// Returns once the stop is initiated; completion is reported by a
    /// `Stopped` status event.
    pub async fn stop(&self) -> Result<StopOutcome, SupervisorError> {
        let _operation = self.inner.operations.lock().await;
        self.inner.stop_locked().await
    }

    /// Verified server status.
    ///
    /// With no live handle, any leftover instance is killed before
    /// `Stopped` is reported.
    pub async fn status(&self) -> ServerStatus {
        let _operation = self.inner.operations.lock().await;

        if self.inner.live().await.is_some() {
            return ServerStatus::Running;
        }

        if !self.inner.reclaim_leftovers().await.is_empty() {
            sleep(self.inner.timings.leftover_settle).await;
        }
        ServerStatus::Stopped
    }

    /// Stop, wait the restart delay, then start.
    ///
    /// Not atomic: another request may run between the two halves.
    pub async fn restart(&self) -> Result<u32, SupervisorError> {
        match self.stop().await {
            Ok(outcome) => debug!(?outcome, "Restart: stop requested"),
            Err(SupervisorError::NotRunning) => debug!("Restart: server was not running"),
            Err(e) => return Err(e),
        }

        sleep(self.inner.timings.restart_delay).await;
        self.start().await
    }

    /// Write a console command to the running server.
    pub async fn send_command(&self, command: &str) -> Result<(), SupervisorError> {
        let Some(tracked) = self.inner.live().await else {
            return Err(SupervisorError::NotRunning);
        };

        let limit = self.inner.timings.stop_timeout;
        tracked.process.write_line_within(command, limit).await.map_err(|e| {
            debug!(pid = %tracked.process.pid(), error = %e, "Failed to send command");
            SupervisorError::PipeClosed
        })
    }

    /// Force-kill the tracked server, if any. Used when the panel exits.
    pub async fn shutdown(&self) {
        let _operation = self.inner.operations.lock().await;
        let tracked = self.inner.slot.lock().await.take();
        if let Some(tracked) = tracked {
            info!(pid = %tracked.process.pid(), "Shutting down server with the panel");
            self.inner.discard(tracked).await;
        }
    }

    /// PID of the live tracked server.
    pub async fn pid(&self) -> Option<u32> {
        self.inner.live().await.map(|tracked| tracked.process.pid())
    }

    /// Subscribe to status and console events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.inner.relay.subscribe()
    }

    /// The relay all events are published through.
    pub fn relay(&self) -> Arc<EventRelay> {
        Arc::clone(&self.inner.relay)
    }

    /// Number of times a tracked server had to be force-killed.
    pub fn forced_kill_count(&self) -> u64 {
        self.inner.forced_kills.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for ServerSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSupervisor")
            .field("executable", &self.inner.launch.executable)
            .finish_non_exhaustive()
    }
}

impl Inner {
    async fn start_locked(self: &Arc<Self>) -> Result<u32, SupervisorError> {
        if let Some(package) = &self.package {
            if !package.is_installed() {
                return Err(SupervisorError::NotInstalled(package.location().to_path_buf()));
            }
        }

        if !self.reclaim_leftovers().await.is_empty() {
            sleep(self.timings.leftover_settle).await;
        }

        let stale = self.slot.lock().await.take();
        if let Some(stale) = stale {
            debug!(pid = %stale.process.pid(), "Discarding previous server handle");
            self.discard(stale).await;
            sleep(self.timings.stale_settle).await;
        }

        let mut slot = self.slot.lock().await;
        if let Some(current) = slot.as_ref().filter(|t| t.process.is_alive()) {
            return Err(SupervisorError::AlreadyRunning(current.process.pid()));
        }

        let (process, events) = match ManagedProcess::spawn(&self.launch) {
            Ok(spawned) => spawned,
            Err(e) => {
                error!(error = %e, "Failed to start server");
                self.relay.publish(ServerEvent::log(
                    LogStream::Panel,
                    format!("Failed to start server: {e}"),
                ));
                return Err(SupervisorError::Spawn(e));
            }
        };

        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let pid = process.pid();
        *slot = Some(Tracked {
            generation,
            process: Arc::new(process),
        });
        drop(slot);

        info!(pid = %pid, generation, "Server started");
        self.relay.publish(ServerEvent::running(pid));
        tokio::spawn(forward_events(Arc::clone(self), generation, events));

        Ok(pid)
    }

    async fn stop_locked(self: &Arc<Self>) -> Result<StopOutcome, SupervisorError> {
        let Some(tracked) = self.live().await else {
            let killed = self.reclaim_leftovers().await;
            return match killed.first() {
                Some(&pid) => {
                    self.relay.publish(ServerEvent::stopped());
                    Ok(StopOutcome::LeftoverKilled { pid })
                }
                None => Err(SupervisorError::NotRunning),
            };
        };

        let pid = tracked.process.pid();
        // A server that no longer reads its input is treated as hung
        match tracked
            .process
            .write_line_within(STOP_COMMAND, self.timings.stop_timeout)
            .await
        {
            Ok(()) => {
                info!(pid = %pid, "Requested graceful server stop");
                tokio::spawn(escalate_stop(Arc::clone(self), tracked.generation));
                Ok(StopOutcome::GracefulRequested { pid })
            }
            Err(e) => {
                warn!(pid = %pid, error = %e, "Server input unavailable, forcing stop");
                if let Some(tracked) = self.take_live(tracked.generation).await {
                    self.discard(tracked).await;
                }
                Ok(StopOutcome::Forced { pid })
            }
        }
    }

    /// The tracked handle, if its process is still alive.
    async fn live(&self) -> Option<Tracked> {
        self.slot
            .lock()
            .await
            .as_ref()
            .filter(|tracked| tracked.process.is_alive())
            .cloned()
    }

    /// Remove the tracked handle if it is still `generation` and alive.
    async fn take_live(&self, generation: u64) -> Option<Tracked> {
        let mut slot = self.slot.lock().await;
        let current = slot
            .as_ref()
            .is_some_and(|t| t.generation == generation && t.process.is_alive());
        if current { slot.take() } else { None }
    }

    /// Remove the tracked handle if it is still `generation`, alive or not.
    async fn take_generation(&self, generation: u64) -> Option<Tracked> {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|t| t.generation == generation) {
            slot.take()
        } else {
            None
        }
    }

    /// Kill a handle that has already been removed from the slot.
    ///
    /// Publishes exactly one `Stopped` per removed handle.
    async fn discard(&self, tracked: Tracked) {
        let pid = tracked.process.pid();
        if tracked.process.is_alive() {
            tracked.process.terminate_tree().await;
            self.forced_kills.fetch_add(1, Ordering::Relaxed);
            warn!(pid = %pid, "Force-killed server process");
            self.relay.publish(ServerEvent::log(
                LogStream::Panel,
                format!("Server process {pid} was force-killed"),
            ));
        }
        self.relay.publish(ServerEvent::stopped());
    }

    /// Kill every untracked server instance. Returns the PIDs found.
    async fn reclaim_leftovers(&self) -> Vec<u32> {
        let tracked_pid = self
            .slot
            .lock()
            .await
            .as_ref()
            .map(|tracked| tracked.process.pid());

        let leftovers: Vec<u32> = self
            .directory
            .find_all_by_executable_name(&self.executable_name)
            .await
            .into_iter()
            .filter(|pid| Some(*pid) != tracked_pid)
            .collect();

        for &pid in &leftovers {
            let outcome = self.directory.kill_by_pid(pid).await;
            warn!(pid = %pid, ?outcome, "Killed leftover server process");
            self.relay.publish(ServerEvent::log(
                LogStream::Panel,
                format!("Killed leftover server process {pid}"),
            ));
        }
        leftovers
    }
}

/// Relay a handle's output and react to its exit.
async fn forward_events(inner: Arc<Inner>, generation: u64, mut events: ProcessEvents) {
    while let Some(event) = events.recv().await {
        match event {
            ProcessEvent::Output { stream, line } => {
                inner.relay.publish(ServerEvent::log(stream, line));
            }
            ProcessEvent::Exited(exit) => {
                if inner.take_generation(generation).await.is_some() {
                    inner.relay.publish(ServerEvent::stopped());
                }
                info!(generation, code = ?exit.code, "Server process exited");
                inner.relay.publish(ServerEvent::log(
                    LogStream::Panel,
                    format!("Server stopped with code {exit}"),
                ));
                break;
            }
        }
    }
}

/// Force-kill the handle if it outlives the stop timeout.
async fn escalate_stop(inner: Arc<Inner>, generation: u64) {
    sleep(inner.timings.stop_timeout).await;

    let Some(tracked) = inner.take_live(generation).await else {
        debug!(generation, "Server stopped before the stop timeout");
        return;
    };

    warn!(
        pid = %tracked.process.pid(),
        timeout = ?inner.timings.stop_timeout,
        "Server ignored stop command, forcing shutdown"
    );
    inner.discard(tracked).await;
}
