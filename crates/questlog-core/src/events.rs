//! Process-wide session notifications.
//!
//! The gateway publishes `SessionEvent::Expired` here whenever a call fails
//! with an authorization-class status. Views subscribe explicitly, so who is
//! listening (and for how long) is visible in the code.

use tokio::sync::broadcast;
use tracing::debug;

/// Buffer for undelivered events per subscriber. Expiry events are rare and
/// idempotent to consume, so a lagging subscriber losing some is harmless.
const EVENT_BUFFER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The stored credential was rejected and has been cleared.
    Expired,
}

/// Publish/subscribe channel for session events. Clones share the channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish one expiry event. Having no subscribers is not an error.
    pub fn emit_expired(&self) {
        let receivers = self.tx.send(SessionEvent::Expired).unwrap_or(0);
        debug!(receivers, "Session expired event emitted");
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_every_subscriber_sees_one_event() {
        let events = SessionEvents::new();
        let mut a = events.subscribe();
        let mut b = events.clone().subscribe();

        events.emit_expired();

        assert_eq!(a.try_recv().unwrap(), SessionEvent::Expired);
        assert_eq!(b.try_recv().unwrap(), SessionEvent::Expired);
        assert!(matches!(a.try_recv(), Err(TryRecvError::Empty)));
        assert!(matches!(b.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let events = SessionEvents::new();
        events.emit_expired();
        // Late subscribers do not see earlier events.
        let mut rx = events.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
