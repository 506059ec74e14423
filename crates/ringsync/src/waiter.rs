//! Blocking-pull protocol shared by the concurrent containers.
//!
//! A container keeps a [`WaitState`] next to its storage under the same lock.
//! Consumers that find the container empty register as waiters and sleep on
//! the container's condition variable. Three things end a wait besides data
//! arriving:
//!
//! - `wait_break()` deposits one token; exactly one waiter that wakes to an
//!   empty container consumes it and returns [`WaitError::Interrupted`].
//!   Tokens never outnumber registered waiters, so a break issued while nobody
//!   waits is lost, like a bare condition-variable notify.
//! - `close()` sets a flag and wakes every waiter; each one that finds the
//!   container empty returns [`WaitError::Closed`].
//! - the deadline of a timed wait.
//!
//! Spurious wake-ups and consumers racing for the same element just go back
//! to sleep.

use crate::invariants::debug_assert_breaks_bounded;
use crate::metrics::Metrics;
use crate::WaitError;
use parking_lot::{Condvar, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Waiter bookkeeping, mutated only under the container lock.
#[derive(Debug, Default)]
pub(crate) struct WaitState {
    /// Consumers currently suspended in a blocking pull
    waiting: usize,
    /// Undelivered `wait_break` tokens
    breaks: usize,
    closed: bool,
}

impl WaitState {
    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    pub(crate) fn reopen(&mut self) {
        self.closed = false;
    }

    /// Number of consumers blocked right now.
    #[inline]
    pub(crate) fn waiting(&self) -> usize {
        self.waiting
    }

    /// Deposits a token for one waiter. Returns `false` when every waiter
    /// already has one pending, in which case nobody needs waking.
    pub(crate) fn request_break(&mut self) -> bool {
        if self.breaks >= self.waiting {
            return false;
        }
        self.breaks += 1;
        debug_assert_breaks_bounded!(self.breaks, self.waiting);
        true
    }

    fn enter(&mut self) {
        self.waiting += 1;
    }

    fn take_break(&mut self) -> bool {
        if self.breaks == 0 {
            return false;
        }
        self.breaks -= 1;
        true
    }

    fn has_pending_break(&self) -> bool {
        self.breaks > 0
    }

    fn leave(&mut self) {
        self.waiting -= 1;
        // A waiter that left with data or by timeout cannot take its token
        // with it; drop tokens nobody is left to consume.
        self.breaks = self.breaks.min(self.waiting);
        debug_assert_breaks_bounded!(self.breaks, self.waiting);
    }
}

/// Container state a blocking pull can operate on.
pub(crate) trait Waitable {
    type Item;

    /// Non-blocking pull of the front element.
    fn take_front(&mut self) -> Option<Self::Item>;

    fn wait_state(&mut self) -> &mut WaitState;

    fn metrics_mut(&mut self) -> &mut Metrics;
}

/// Turns a relative timeout into a deadline. Timeouts too large to represent
/// mean "wait forever".
#[inline]
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Pulls the front element, suspending on `cond` while the container is
/// empty.
///
/// The lock is released while suspended and re-acquired on every wake-up, at
/// which point emptiness is re-validated.
pub(crate) fn pull_wait<S: Waitable>(
    cond: &Condvar,
    guard: &mut MutexGuard<'_, S>,
    deadline: Option<Instant>,
) -> Result<S::Item, WaitError> {
    if let Some(item) = guard.take_front() {
        return Ok(item);
    }
    if guard.wait_state().is_closed() {
        return Err(WaitError::Closed);
    }

    guard.wait_state().enter();
    let outcome = loop {
        let timed_out = match deadline {
            Some(deadline) => cond.wait_until(guard, deadline).timed_out(),
            None => {
                cond.wait(guard);
                false
            }
        };

        if let Some(item) = guard.take_front() {
            break Ok(item);
        }
        let state = guard.wait_state();
        if state.take_break() {
            break Err(WaitError::Interrupted);
        }
        if state.is_closed() {
            break Err(WaitError::Closed);
        }
        if timed_out {
            break Err(WaitError::TimedOut);
        }
        trace!("woken with nothing to pull, waiting again");
    };
    guard.wait_state().leave();
    // This waiter may have been the one notified for a token it did not
    // consume; pass the wake-up on.
    if guard.wait_state().has_pending_break() {
        cond.notify_one();
    }

    match outcome {
        Err(WaitError::TimedOut) => {
            trace!("blocking pull timed out");
            guard.metrics_mut().add_wait_timeout();
        }
        Err(WaitError::Interrupted) => {
            debug!("blocking pull interrupted by wait_break");
            guard.metrics_mut().add_wait_interrupt();
        }
        Err(WaitError::Closed) => debug!("blocking pull ended by close"),
        Err(WaitError::ZeroCapacity) | Ok(_) => {}
    }
    outcome
}
