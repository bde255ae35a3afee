//! Async stream line readers (non-UTF8-safe).
//!
//! The dedicated server can emit non-UTF8 bytes on stdout/stderr.
//! Using `BufReader::lines()` would terminate the reader task on invalid UTF-8,
//! so lines are read as bytes and decoded lossily.

use mineserver_core::LogStream;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::events::ProcessEvent;

/// Spawn a task forwarding each line of `stream` as a `ProcessEvent::Output`.
///
/// The task keeps draining after the receiver is gone so the child never
/// blocks on a full pipe. It ends at EOF or on a read error.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    pid: u32,
    kind: LogStream,
    events: UnboundedSender<ProcessEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    // Trim trailing newline(s)
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let line = String::from_utf8_lossy(&buf).into_owned();
                    trace!(pid = %pid, stream = kind.as_str(), "{}", line);
                    let _ = events.send(ProcessEvent::Output { stream: kind, line });
                }
                Err(e) => {
                    debug!(pid = %pid, stream = kind.as_str(), error = %e, "stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(pid = %pid, stream = kind.as_str(), "stream reader task exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    async fn collect(input: &'static [u8]) -> Vec<ProcessEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_stream_reader(input, 1, LogStream::Stdout, tx)
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn output(line: &str) -> ProcessEvent {
        ProcessEvent::Output {
            stream: LogStream::Stdout,
            line: line.to_string(),
        }
    }

    #[tokio::test]
    async fn splits_lines_and_strips_line_endings() {
        let events = collect(b"Starting Server\r\nServer started.\nlast").await;
        assert_eq!(
            events,
            vec![
                output("Starting Server"),
                output("Server started."),
                output("last"),
            ]
        );
    }

    #[tokio::test]
    async fn decodes_invalid_utf8_lossily() {
        let events = collect(b"bad \xff byte\n").await;
        assert_eq!(events, vec![output("bad \u{fffd} byte")]);
    }

    #[tokio::test]
    async fn keeps_draining_without_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let handle = spawn_stream_reader(&b"one\ntwo\n"[..], 1, LogStream::Stderr, tx);
        assert!(handle.await.is_ok());
    }
}
