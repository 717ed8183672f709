//! Single-flight coordination for token refreshes.
//!
//! The first request to see a 401 becomes the leader and performs the
//! refresh; every request that sees a 401 while that refresh is running
//! queues behind it instead of starting another one. When the leader
//! finishes, the queue is drained in arrival order with the leader's result.
//!
//! States: `Idle` → `Refreshing { waiters }` → draining → `Idle`. Draining
//! takes the waiter list and resets the gate to `Idle` in the same critical
//! section, then resolves the waiters outside the lock. A leader that is
//! dropped mid-refresh drains the queue with [`RefreshFailure::Abandoned`],
//! so the gate cannot get stuck in `Refreshing`.
//!
//! A request that was rejected with an older token than the one now stored
//! has already been overtaken by a finished refresh. That check runs under
//! the gate lock, together with the choice of leader, so a request cannot
//! miss a refresh that completes between its 401 and its `acquire`.

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::RefreshFailure;

/// Result of one refresh cycle: the new access token, or why there is none.
pub(crate) type RefreshOutcome = std::result::Result<String, RefreshFailure>;

type Waiter = oneshot::Sender<RefreshOutcome>;

#[derive(Debug)]
enum GateState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

/// The refresh-in-progress flag and pending queue, as one state machine.
#[derive(Debug)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

/// What a request that hit a 401 should do next.
pub(crate) enum Ticket<'a> {
    /// A refresh already replaced the rejected token: replay with this one.
    Ready(String),
    /// No refresh is running: perform it, then call [`LeaderGuard::finish`].
    Leader(LeaderGuard<'a>),
    /// A refresh is running: wait for its outcome.
    Follower(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
        }
    }

    /// Become the leader of a new refresh, or join the running one.
    pub(crate) fn acquire(&self) -> Ticket<'_> {
        self.acquire_with(|| None)
    }

    /// Like [`RefreshGate::acquire`], for a request rejected while carrying
    /// `sent_with`.
    ///
    /// `current` reads the stored access token. It is called with the gate
    /// locked and must not touch the gate. The leader stores its new token
    /// before draining, so a stored token that differs from `sent_with`
    /// means the request can be replayed without another refresh.
    pub(crate) fn acquire_after_401(
        &self,
        sent_with: Option<&str>,
        current: impl FnOnce() -> Option<String>,
    ) -> Ticket<'_> {
        self.acquire_with(|| current().filter(|token| sent_with != Some(token.as_str())))
    }

    fn acquire_with(&self, replacement: impl FnOnce() -> Option<String>) -> Ticket<'_> {
        let mut state = self.state.lock();
        if let GateState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            tracing::debug!(queued = waiters.len(), "Queued behind in-flight refresh");
            return Ticket::Follower(rx);
        }

        if let Some(token) = replacement() {
            return Ticket::Ready(token);
        }

        *state = GateState::Refreshing {
            waiters: Vec::new(),
        };
        Ticket::Leader(LeaderGuard {
            gate: self,
            finished: false,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), GateState::Refreshing { .. })
    }

    fn drain(&self, outcome: &RefreshOutcome) {
        let waiters = match std::mem::replace(&mut *self.state.lock(), GateState::Idle) {
            GateState::Refreshing { waiters } => waiters,
            GateState::Idle => Vec::new(),
        };

        for waiter in waiters {
            // A waiter whose request was dropped no longer cares.
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Wait for a follower's outcome. A vanished leader counts as abandoned.
pub(crate) async fn wait_for_leader(rx: oneshot::Receiver<RefreshOutcome>) -> RefreshOutcome {
    rx.await.unwrap_or(Err(RefreshFailure::Abandoned))
}

/// Held by the request performing the refresh.
pub(crate) struct LeaderGuard<'a> {
    gate: &'a RefreshGate,
    finished: bool,
}

impl LeaderGuard<'_> {
    /// Publish the outcome to every queued request and reopen the gate.
    pub(crate) fn finish(mut self, outcome: &RefreshOutcome) {
        self.finished = true;
        self.gate.drain(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("Refresh leader dropped before finishing");
            self.gate.drain(&Err(RefreshFailure::Abandoned));
        }
    }
}
