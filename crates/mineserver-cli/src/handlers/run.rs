//! Run command handler.
//!
//! Starts the server and attaches an interactive console: server output is
//! streamed to the terminal and typed lines are forwarded as server
//! commands. Lines starting with `:` are panel directives.

use anyhow::Result;
use mineserver_core::{ConfigStore, LogStream, ServerEvent, ServerStatus};
use mineserver_runtime::{StopOutcome, SupervisorError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// A line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Empty,
    Stop,
    Restart,
    Status,
    Quit,
    /// Forwarded to the server verbatim.
    Command(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => Self::Empty,
            ":stop" => Self::Stop,
            ":restart" => Self::Restart,
            ":status" => Self::Status,
            ":quit" | ":exit" => Self::Quit,
            _ => Self::Command(trimmed.to_string()),
        }
    }
}

/// What the console does after a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    Continue,
    /// The server stopped on its own; the console stays open.
    Notify,
    Exit,
}

/// Console bookkeeping across server stops and restarts.
#[derive(Debug, Default)]
struct ConsoleState {
    /// A stop was requested from the console.
    stopping: bool,
    /// PID of a restarted server whose `Running` event is still queued.
    /// Stop events ahead of it belong to the replaced process.
    restarted: Option<u32>,
}

impl ConsoleState {
    fn stop_requested(&mut self) {
        self.stopping = true;
    }

    fn restarted(&mut self, pid: u32) {
        self.stopping = false;
        self.restarted = Some(pid);
    }

    fn on_event(&mut self, event: &ServerEvent, stdin_open: bool) -> Reaction {
        match event {
            ServerEvent::StatusChanged {
                status: ServerStatus::Running,
                pid,
                ..
            } => {
                if self.restarted.is_some() && self.restarted == *pid {
                    self.restarted = None;
                }
                Reaction::Continue
            }
            ServerEvent::StatusChanged {
                status: ServerStatus::Stopped,
                ..
            } => {
                if self.restarted.is_some() {
                    Reaction::Continue
                } else if self.stopping || !stdin_open {
                    Reaction::Exit
                } else {
                    Reaction::Notify
                }
            }
            _ => Reaction::Continue,
        }
    }
}

/// Execute the run command.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    if !ctx.is_installed() {
        return Err(CliError::NotInstalled(format!(
            "Server is not installed at {}",
            ctx.config.executable.display()
        ))
        .into());
    }

    // The server reads server.properties at launch
    let settings = ctx.store.load().await.map_err(CliError::from)?;
    ctx.store.save(&settings).await.map_err(CliError::from)?;

    let mut events = ctx.supervisor.subscribe();
    let pid = ctx.supervisor.start().await.map_err(CliError::from)?;
    println!("Server started (PID {pid}). Press Ctrl+C to stop.");
    println!("Console directives: :stop, :restart, :status, :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut state = ConsoleState::default();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    print_event(&event);
                    match state.on_event(&event, stdin_open) {
                        Reaction::Continue => {}
                        Reaction::Notify => {
                            println!("Server stopped. Use :restart to start it again or :quit to exit.");
                        }
                        Reaction::Exit => break,
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Console fell behind, events dropped"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match ConsoleInput::parse(&line) {
                    ConsoleInput::Empty => {}
                    ConsoleInput::Quit => break,
                    ConsoleInput::Stop => {
                        if !request_stop(ctx).await {
                            break;
                        }
                        state.stop_requested();
                    }
                    ConsoleInput::Restart => match ctx.supervisor.restart().await {
                        Ok(pid) => {
                            state.restarted(pid);
                            println!("Server restarted (PID {pid}).");
                        }
                        Err(e) => eprintln!("Restart failed: {e}"),
                    },
                    ConsoleInput::Status => {
                        println!("Server is {}", ctx.supervisor.status().await);
                    }
                    ConsoleInput::Command(command) => {
                        if let Err(e) = ctx.supervisor.send_command(&command).await {
                            eprintln!("{e}");
                        }
                    }
                },
                Ok(None) => {
                    debug!("Console input closed");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read console input");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c(), if !state.stopping => {
                println!("Stopping server...");
                if !request_stop(ctx).await {
                    break;
                }
                state.stop_requested();
            }
        }
    }

    ctx.supervisor.shutdown().await;
    Ok(())
}

/// Ask the supervisor to stop. Returns `false` when there is nothing left
/// to wait for.
async fn request_stop(ctx: &CliContext) -> bool {
    match ctx.supervisor.stop().await {
        Ok(StopOutcome::GracefulRequested { pid }) => {
            debug!(pid = %pid, "Waiting for server to stop");
            true
        }
        Ok(outcome) => {
            debug!(?outcome, "Server stopped");
            false
        }
        Err(SupervisorError::NotRunning) => {
            println!("Server is not running.");
            false
        }
        Err(e) => {
            eprintln!("Stop failed: {e}");
            false
        }
    }
}

fn print_event(event: &ServerEvent) {
    match event {
        ServerEvent::Log(entry) => match entry.stream {
            LogStream::Stdout => println!("{}", entry.line),
            LogStream::Stderr => eprintln!("ERROR: {}", entry.line),
            LogStream::Panel => println!("[panel] {}", entry.line),
        },
        ServerEvent::StatusChanged {
            status,
            pid: Some(pid),
            ..
        } => println!("[panel] Server {status} (PID {pid})"),
        ServerEvent::StatusChanged { status, .. } => println!("[panel] Server {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives() {
        assert_eq!(ConsoleInput::parse(":stop"), ConsoleInput::Stop);
        assert_eq!(ConsoleInput::parse("  :restart "), ConsoleInput::Restart);
        assert_eq!(ConsoleInput::parse(":status"), ConsoleInput::Status);
        assert_eq!(ConsoleInput::parse(":quit"), ConsoleInput::Quit);
        assert_eq!(ConsoleInput::parse(":exit"), ConsoleInput::Quit);
    }

    #[test]
    fn test_stop_from_console_exits_on_stopped() {
        let mut state = ConsoleState::default();
        assert_eq!(
            state.on_event(&ServerEvent::stopped(), true),
            Reaction::Notify
        );

        state.stop_requested();
        assert_eq!(state.on_event(&ServerEvent::stopped(), true), Reaction::Exit);
    }

    #[test]
    fn test_closed_input_exits_on_stopped() {
        let mut state = ConsoleState::default();
        assert_eq!(state.on_event(&ServerEvent::stopped(), false), Reaction::Exit);
    }

    #[test]
    fn test_restart_ignores_stop_of_replaced_server() {
        let mut state = ConsoleState::default();
        state.stop_requested();
        state.restarted(200);

        // Queued while the restart was in flight
        assert_eq!(
            state.on_event(&ServerEvent::stopped(), true),
            Reaction::Continue
        );
        assert_eq!(
            state.on_event(&ServerEvent::running(200), true),
            Reaction::Continue
        );

        // The new server stopping on its own is reported again
        assert_eq!(
            state.on_event(&ServerEvent::stopped(), true),
            Reaction::Notify
        );
    }

    #[test]
    fn test_restart_waits_for_its_own_running_event() {
        let mut state = ConsoleState::default();
        state.restarted(200);

        state.on_event(&ServerEvent::running(100), true);
        assert_eq!(
            state.on_event(&ServerEvent::stopped(), true),
            Reaction::Continue
        );
        state.on_event(&ServerEvent::log(LogStream::Stdout, "Server started."), true);
        state.on_event(&ServerEvent::running(200), true);
        assert_eq!(
            state.on_event(&ServerEvent::stopped(), true),
            Reaction::Notify
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleInput::parse(""), ConsoleInput::Empty);
        assert_eq!(ConsoleInput::parse("   "), ConsoleInput::Empty);
        assert_eq!(
            ConsoleInput::parse("say hello\r"),
            ConsoleInput::Command("say hello".to_string())
        );
        // Plain `stop` goes to the server like any other command
        assert_eq!(
            ConsoleInput::parse("stop"),
            ConsoleInput::Command("stop".to_string())
        );
        assert_eq!(
            ConsoleInput::parse(":unknown"),
            ConsoleInput::Command(":unknown".to_string())
        );
    }
}
