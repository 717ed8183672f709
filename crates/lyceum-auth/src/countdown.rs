//! Forced-logout countdown shown after a session expiry warning.
//!
//! Once opened, the countdown logs the user out when it reaches zero,
//! regardless of what the server thinks. The only way to stop it is a
//! successful [`extend`](ExpiryCountdown::extend), which performs one
//! session renewal, or an explicit [`cancel`](ExpiryCountdown::cancel).
//!
//! There is never more than one timer per countdown, and logout happens at
//! most once per opening.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::error::Result;

/// Default time between opening the countdown and the forced logout.
pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(60);

/// What the countdown drives: one renewal attempt, or a local logout.
#[async_trait]
pub trait SessionControl: Send + Sync {
    /// Attempt to renew the session once.
    async fn renew(&self) -> Result<()>;

    /// End the session on the client side.
    fn logout(&self);
}

/// How a countdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    /// The session was renewed before the deadline.
    Extended,
    /// The deadline passed or renewal failed; the user was logged out.
    LoggedOut,
    /// Closed without renewal or logout.
    Cancelled,
}

/// Observable countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Running { remaining: Duration },
    Closed(CountdownOutcome),
}

enum Phase {
    Idle,
    Running {
        generation: u64,
        deadline: Instant,
        timer: AbortHandle,
    },
    Closed(CountdownOutcome),
}

struct Inner {
    control: Arc<dyn SessionControl>,
    duration: Duration,
    phase: Mutex<Phase>,
    generation: Mutex<u64>,
    // Serializes extend() so rapid repeats join a single renewal.
    extending: tokio::sync::Mutex<()>,
    outcome: watch::Sender<Option<CountdownOutcome>>,
}

impl Inner {
    /// Close the countdown opened as `generation`, if it is still running.
    ///
    /// Returns false when that opening has already been closed.
    fn finish(&self, generation: u64, outcome: CountdownOutcome, from_timer: bool) -> bool {
        let timer = {
            let mut phase = self.phase.lock();
            let timer = match &*phase {
                Phase::Running {
                    generation: current,
                    timer,
                    ..
                } if *current == generation => timer.clone(),
                _ => return false,
            };
            *phase = Phase::Closed(outcome);
            timer
        };

        if !from_timer {
            timer.abort();
        }
        if outcome == CountdownOutcome::LoggedOut {
            tracing::info!("Session countdown elapsed, logging out");
            self.control.logout();
        }
        self.outcome.send_replace(Some(outcome));
        true
    }

    fn running_generation(&self) -> Option<u64> {
        match &*self.phase.lock() {
            Phase::Running { generation, .. } => Some(*generation),
            _ => None,
        }
    }
}

/// A cancellable, single-timer logout countdown.
///
/// Dropping the countdown stops its timer without logging out.
pub struct ExpiryCountdown {
    inner: Arc<Inner>,
}

impl ExpiryCountdown {
    /// Create a countdown with the default 60 second duration.
    pub fn new(control: Arc<dyn SessionControl>) -> Self {
        Self::with_duration(control, DEFAULT_COUNTDOWN)
    }

    pub fn with_duration(control: Arc<dyn SessionControl>, duration: Duration) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                control,
                duration,
                phase: Mutex::new(Phase::Idle),
                generation: Mutex::new(0),
                extending: tokio::sync::Mutex::new(()),
                outcome,
            }),
        }
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    /// Start the countdown.
    ///
    /// Returns false, and changes nothing, if it is already running.
    /// Must be called from within a Tokio runtime.
    pub fn open(&self) -> bool {
        let mut phase = self.inner.phase.lock();
        if matches!(*phase, Phase::Running { .. }) {
            return false;
        }

        let generation = {
            let mut counter = self.inner.generation.lock();
            *counter += 1;
            *counter
        };

        let inner = Arc::clone(&self.inner);
        let duration = self.inner.duration;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            inner.finish(generation, CountdownOutcome::LoggedOut, true);
        });

        *phase = Phase::Running {
            generation,
            deadline: Instant::now() + duration,
            timer: handle.abort_handle(),
        };
        self.inner.outcome.send_replace(None);
        tracing::debug!(secs = duration.as_secs(), "Session countdown opened");
        true
    }

    /// Try to keep the session alive.
    ///
    /// Performs one renewal. On success the countdown closes as
    /// [`Extended`](CountdownOutcome::Extended); on failure the user is
    /// logged out immediately. Calls made while a renewal is in flight wait
    /// for it and report its result instead of renewing again.
    ///
    /// Returns `None` if the countdown was never opened.
    pub async fn extend(&self) -> Option<CountdownOutcome> {
        let _guard = self.inner.extending.lock().await;

        let Some(generation) = self.inner.running_generation() else {
            return self.outcome();
        };

        match self.inner.control.renew().await {
            Ok(()) => {
                self.inner
                    .finish(generation, CountdownOutcome::Extended, false);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session renewal failed");
                self.inner
                    .finish(generation, CountdownOutcome::LoggedOut, false);
            }
        }

        self.outcome()
    }

    /// Close the countdown without renewing or logging out.
    pub fn cancel(&self) -> bool {
        match self.inner.running_generation() {
            Some(generation) => {
                self.inner
                    .finish(generation, CountdownOutcome::Cancelled, false)
            }
            None => false,
        }
    }

    /// Outcome of the most recent opening, if it has ended.
    pub fn outcome(&self) -> Option<CountdownOutcome> {
        *self.inner.outcome.borrow()
    }

    pub fn state(&self) -> CountdownState {
        match &*self.inner.phase.lock() {
            Phase::Idle => CountdownState::Idle,
            Phase::Running { deadline, .. } => CountdownState::Running {
                remaining: deadline.saturating_duration_since(Instant::now()),
            },
            Phase::Closed(outcome) => CountdownState::Closed(*outcome),
        }
    }

    /// Wait until the current opening ends.
    ///
    /// Returns [`Cancelled`](CountdownOutcome::Cancelled) at once if the
    /// countdown was never opened.
    pub async fn wait(&self) -> CountdownOutcome {
        let mut rx = self.inner.outcome.subscribe();
        if matches!(*self.inner.phase.lock(), Phase::Idle) {
            return CountdownOutcome::Cancelled;
        }
        // The sender lives in `inner`, which we hold, so the channel stays open.
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).unwrap_or(CountdownOutcome::Cancelled),
            Err(_) => CountdownOutcome::Cancelled,
        }
    }
}

impl Drop for ExpiryCountdown {
    fn drop(&mut self) {
        if let Phase::Running { timer, .. } = &*self.inner.phase.lock() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for ExpiryCountdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryCountdown")
            .field("duration", &self.inner.duration)
            .field("state", &self.state())
            .finish()
    }
}
