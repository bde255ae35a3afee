//! Server event relay for observers.
//!
//! Every status change and console line flows through one relay. Observers
//! subscribe to a broadcast channel; a bounded history of log lines is kept
//! so a late observer can replay recent console output.

use std::collections::VecDeque;
use std::sync::Mutex;

use mineserver_core::{ServerEvent, ServerLogEntry};
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast channel capacity for server events
const CHANNEL_CAPACITY: usize = 256;

/// Number of console lines kept for replay
pub const MAX_LOG_LINES: usize = 1000;

/// Fire-and-forget publisher of server events.
///
/// Publishing never blocks and never fails: with no subscribers the event is
/// dropped, and a lagging subscriber loses the oldest events.
pub struct EventRelay {
    sender: broadcast::Sender<ServerEvent>,
    history: Mutex<VecDeque<ServerLogEntry>>,
}

impl EventRelay {
    /// Create a new relay
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            history: Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES)),
        }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ServerEvent) {
        if let ServerEvent::Log(entry) = &event {
            if let Ok(mut history) = self.history.lock() {
                if history.len() == MAX_LOG_LINES {
                    history.pop_front();
                }
                history.push_back(entry.clone());
            }
        }

        if self.sender.receiver_count() > 0 {
            trace!(?event, "Publishing server event");
            let _ = self.sender.send(event);
        }
    }

    /// Subscribe to server events
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Most recent console lines, oldest first.
    pub fn recent_logs(&self) -> Vec<ServerLogEntry> {
        self.history
            .lock()
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mineserver_core::{LogStream, ServerStatus};

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let relay = EventRelay::new();
        relay.publish(ServerEvent::stopped());
        relay.publish(ServerEvent::log(LogStream::Stdout, "early"));

        // Late subscribers get no replay; console history still has the line
        let mut rx = relay.subscribe();
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
        let logs = relay.recent_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].line, "early");
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let relay = EventRelay::new();
        let mut rx = relay.subscribe();

        relay.publish(ServerEvent::running(7));
        relay.publish(ServerEvent::log(LogStream::Stdout, "hello"));

        assert_eq!(
            rx.recv().await.unwrap().status(),
            Some(ServerStatus::Running)
        );
        match rx.recv().await.unwrap() {
            ServerEvent::Log(entry) => assert_eq!(entry.line, "hello"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let relay = EventRelay::new();
        for i in 0..MAX_LOG_LINES + 5 {
            relay.publish(ServerEvent::log(LogStream::Stdout, format!("line {i}")));
        }
        relay.publish(ServerEvent::stopped());

        let logs = relay.recent_logs();
        assert_eq!(logs.len(), MAX_LOG_LINES);
        assert_eq!(logs[0].line, "line 5");
        assert_eq!(
            logs.last().map(|e| e.line.as_str()),
            Some(format!("line {}", MAX_LOG_LINES + 4).as_str())
        );
    }
}
