//! Handle to a single spawned server process.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use mineserver_core::{LaunchSpec, LogStream};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::events::{ProcessEvent, ProcessExit};
use super::shutdown::kill_pid;
use super::spawn_stream_reader;

/// How long the exit watcher waits for stdout/stderr to reach EOF after the
/// process is reaped. A surviving grandchild can hold the pipes open.
const READER_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Default limit for a single write to the server input.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(3);

/// How long `terminate_tree` waits for the exit watcher to reap the child.
const REAP_TIMEOUT: Duration = Duration::from_secs(3);

/// Receiving side of a handle's event feed.
pub type ProcessEvents = mpsc::UnboundedReceiver<ProcessEvent>;

/// Errors from process handle operations.
#[derive(Debug, Error)]
pub enum HandleError {
    /// The executable could not be started.
    #[error("Failed to spawn {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The OS did not report a PID for the new child.
    #[error("Spawned process has no PID")]
    NoPid,

    /// The process input stream is closed.
    #[error("Server input stream is closed")]
    PipeClosed,
}

/// Exclusive handle to one spawned server process.
///
/// The handle is alive until the OS reports the exit. Output and the exit
/// notification are delivered through the `ProcessEvents` returned by
/// `spawn`; the producer never blocks on a slow consumer.
pub struct ManagedProcess {
    pid: u32,
    stdin: Mutex<Option<ChildStdin>>,
    exit: watch::Receiver<Option<ProcessExit>>,
}

impl ManagedProcess {
    /// Spawn the executable described by `spec` with all stdio piped.
    ///
    /// No shell is involved, so `pid()` is the server itself.
    /// Must be called from within a tokio runtime.
    pub fn spawn(spec: &LaunchSpec) -> Result<(Self, ProcessEvents), HandleError> {
        let mut child = Command::new(&spec.executable)
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| HandleError::Spawn {
                path: spec.executable.clone(),
                source,
            })?;

        let Some(pid) = child.id() else {
            return Err(HandleError::NoPid);
        };

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_stream_reader(
                stdout,
                pid,
                LogStream::Stdout,
                events_tx.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_stream_reader(
                stderr,
                pid,
                LogStream::Stderr,
                events_tx.clone(),
            ));
        }

        let stdin = child.stdin.take();
        let (exit_tx, exit_rx) = watch::channel(None);
        tokio::spawn(watch_exit(child, pid, readers, events_tx, exit_tx));

        info!(pid = %pid, executable = %spec.executable.display(), "Spawned server process");

        Ok((
            Self {
                pid,
                stdin: Mutex::new(stdin),
                exit: exit_rx,
            },
            events_rx,
        ))
    }

    /// OS process ID.
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the OS has not yet reported the process exit.
    pub fn is_alive(&self) -> bool {
        self.exit.borrow().is_none()
    }

    /// Exit information once the process has been reaped.
    pub fn exit_status(&self) -> Option<ProcessExit> {
        *self.exit.borrow()
    }

    /// Write `text` followed by a newline to the process input.
    ///
    /// Gives up after `WRITE_TIMEOUT`; see `write_line_within`.
    pub async fn write_line(&self, text: &str) -> Result<(), HandleError> {
        self.write_line_within(text, WRITE_TIMEOUT).await
    }

    /// Write `text` followed by a newline, giving up after `limit`.
    ///
    /// A server that stops reading its input fills the pipe; the write then
    /// never completes and is reported as `PipeClosed` once `limit` elapses.
    pub async fn write_line_within(&self, text: &str, limit: Duration) -> Result<(), HandleError> {
        if !self.is_alive() {
            return Err(HandleError::PipeClosed);
        }

        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text.trim_end_matches(['\r', '\n']));
        line.push('\n');

        match timeout(limit, self.write_raw(line.as_bytes())).await {
            Ok(result) => result,
            Err(_) => {
                warn!(pid = %self.pid, timeout = ?limit, "Server input is not being read");
                // A partial line may be in the pipe; nothing more can follow it
                if let Ok(mut stdin) = self.stdin.try_lock() {
                    stdin.take();
                }
                Err(HandleError::PipeClosed)
            }
        }
    }

    async fn write_raw(&self, bytes: &[u8]) -> Result<(), HandleError> {
        let mut guard = self.stdin.lock().await;
        let Some(stdin) = guard.as_mut() else {
            return Err(HandleError::PipeClosed);
        };

        let written = async {
            stdin.write_all(bytes).await?;
            stdin.flush().await
        }
        .await;

        if let Err(e) = written {
            debug!(pid = %self.pid, error = %e, "Write to server input failed");
            *guard = None;
            return Err(HandleError::PipeClosed);
        }
        Ok(())
    }

    /// Force-kill the process and all of its descendants.
    ///
    /// Returns once the child has been reaped (or the reap timeout elapsed).
    /// Safe to call on a dead handle.
    pub async fn terminate_tree(&self) {
        self.stdin.lock().await.take();

        if !self.is_alive() {
            return;
        }

        debug!(pid = %self.pid, "Terminating server process tree");
        kill_pid(self.pid).await;

        if self.wait_timeout(REAP_TIMEOUT).await.is_none() {
            warn!(pid = %self.pid, "Server process not reaped after kill");
        }
    }

    /// Wait for the process to exit.
    pub async fn wait(&self) -> ProcessExit {
        let mut exit = self.exit.clone();
        let result = exit.wait_for(Option::is_some).await.map(|state| *state);
        match result {
            Ok(Some(status)) => status,
            // The watcher only drops its sender after publishing the exit
            _ => ProcessExit { code: None },
        }
    }

    /// Wait for the process to exit, giving up after `limit`.
    pub async fn wait_timeout(&self, limit: Duration) -> Option<ProcessExit> {
        timeout(limit, self.wait()).await.ok()
    }
}

/// Reap the child, let the readers drain, then publish the exit.
///
/// The watch value flips first so `is_alive()` turns false as soon as the
/// OS reports the exit; the `Exited` event follows the remaining output.
async fn watch_exit(
    mut child: Child,
    pid: u32,
    readers: Vec<JoinHandle<()>>,
    events: mpsc::UnboundedSender<ProcessEvent>,
    exit_tx: watch::Sender<Option<ProcessExit>>,
) {
    let exit = match child.wait().await {
        Ok(status) => ProcessExit {
            code: status.code(),
        },
        Err(e) => {
            warn!(pid = %pid, error = %e, "Failed to wait on server process");
            ProcessExit { code: None }
        }
    };
    exit_tx.send_replace(Some(exit));

    for reader in readers {
        if timeout(READER_DRAIN_TIMEOUT, reader).await.is_err() {
            debug!(pid = %pid, "Output pipe still open after exit, not waiting further");
        }
    }

    debug!(pid = %pid, code = ?exit.code, "Server process exited");
    let _ = events.send(ProcessEvent::Exited(exit));
}
