//! Session lifecycle notifications.
//!
//! The HTTP layer detects that a session is no longer valid; the UI layer
//! decides what to do about it. [`SessionEvents`] connects the two without
//! either side knowing about the other. Each subscriber gets its own
//! receiver and unregisters by dropping it.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Buffered events per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 32;

/// Something that happened to the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A token refresh failed terminally; the stored session has been cleared.
    Expired,
    /// A token refresh succeeded.
    Renewed,
    /// The session was ended on the client, explicitly or by a countdown.
    LoggedOut,
}

/// Broadcast hub for [`SessionEvent`]s.
///
/// Cloning yields another handle to the same hub.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Register a new listener. It only sees events emitted after this call.
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Deliver an event to every current listener.
    ///
    /// Returns how many listeners it reached; zero listeners is fine.
    pub fn emit(&self, event: SessionEvent) -> usize {
        tracing::debug!(?event, "Session event");
        self.tx.send(event).unwrap_or(0)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// A listener registration. Dropping it unregisters the listener.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionSubscription {
    /// Wait for the next event. `None` once every hub handle is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session listener lagged, skipping events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session listener lagged, skipping events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Take every buffered event.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
