use crate::metrics::Metrics;
use crate::waiter::{deadline_after, pull_wait, WaitState, Waitable};
use crate::{Config, MetricsSnapshot, Ownership, WaitError};
use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, trace};

/// Thread-safe unbounded double-ended queue with blocking pulls.
///
/// The blocking contract matches [`ConcurrentRingBuffer`](crate::ConcurrentRingBuffer):
/// one lock and one condition variable, `*_notify` pushes wake one consumer,
/// `wait_break` interrupts one, `close` releases all. There is no capacity
/// ceiling and no eviction; producers are responsible for backpressure.
///
/// `push_front` puts an element ahead of everything queued, so it is pulled
/// next.
///
/// # Example
///
/// ```
/// use ringsync::{Config, ConcurrentDeque, WaitError};
/// use std::time::Duration;
///
/// let deque = ConcurrentDeque::new(Config::default());
/// deque.push_back(2);
/// deque.push_front_notify(1);
///
/// assert_eq!(deque.pull_front(), Some(1));
/// assert_eq!(deque.pull_front_wait(), Ok(2));
/// assert_eq!(
///     deque.pull_front_wait_timeout(Duration::from_millis(10)),
///     Err(WaitError::TimedOut)
/// );
/// ```
pub struct ConcurrentDeque<T> {
    state: CachePadded<Mutex<DequeState<T>>>,
    not_empty: Condvar,
}

struct DequeState<T> {
    items: VecDeque<T>,
    ownership: Ownership,
    wait: WaitState,
    metrics: Metrics,
}

impl<T> DequeState<T> {
    fn discard(&mut self, item: T) {
        self.metrics.add_evicted(1);
        self.ownership.dispose(item);
    }
}

impl<T> Waitable for DequeState<T> {
    type Item = T;

    #[inline]
    fn take_front(&mut self) -> Option<T> {
        let item = self.items.pop_front()?;
        self.metrics.add_pulled();
        Some(item)
    }

    #[inline]
    fn wait_state(&mut self) -> &mut WaitState {
        &mut self.wait
    }

    #[inline]
    fn metrics_mut(&mut self) -> &mut Metrics {
        &mut self.metrics
    }
}

impl<T> Drop for DequeState<T> {
    fn drop(&mut self) {
        if !self.items.is_empty() {
            trace!(remaining = self.items.len(), ownership = ?self.ownership, "dropping deque");
        }
        // Owned elements drop with the VecDeque; detached ones must not.
        if self.ownership == Ownership::Detached {
            for item in self.items.drain(..) {
                std::mem::forget(item);
            }
        }
    }
}

impl<T> ConcurrentDeque<T> {
    /// Creates an empty deque.
    ///
    /// `config.capacity` is only the initial reservation; the deque grows
    /// without limit.
    pub fn new(config: Config) -> Self {
        Self {
            state: CachePadded::new(Mutex::new(DequeState {
                items: VecDeque::with_capacity(config.capacity),
                ownership: config.ownership,
                wait: WaitState::default(),
                metrics: Metrics::new(config.enable_metrics),
            })),
            not_empty: Condvar::new(),
        }
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the current number of elements.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Returns true if the deque holds no element.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Returns the ownership policy chosen at construction.
    pub fn ownership(&self) -> Ownership {
        self.state.lock().ownership
    }

    /// Number of consumers currently blocked in a blocking pull.
    pub fn waiting(&self) -> usize {
        self.state.lock().wait.waiting()
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.state.lock().metrics.snapshot()
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Appends an element at the back without waking any consumer.
    pub fn push_back(&self, item: T) {
        let mut state = self.state.lock();
        state.items.push_back(item);
        state.metrics.add_pushed();
    }

    /// Inserts an element at the front without waking any consumer.
    pub fn push_front(&self, item: T) {
        let mut state = self.state.lock();
        state.items.push_front(item);
        state.metrics.add_pushed();
    }

    /// Appends an element at the back and wakes one blocked consumer.
    pub fn push_back_notify(&self, item: T) {
        let mut state = self.state.lock();
        state.items.push_back(item);
        state.metrics.add_pushed();
        self.not_empty.notify_one();
    }

    /// Inserts an element at the front and wakes one blocked consumer.
    pub fn push_front_notify(&self, item: T) {
        let mut state = self.state.lock();
        state.items.push_front(item);
        state.metrics.add_pushed();
        self.not_empty.notify_one();
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Removes and returns the front element without blocking.
    pub fn pull_front(&self) -> Option<T> {
        self.state.lock().take_front()
    }

    /// Removes and returns the front element, blocking while empty.
    ///
    /// Fails with [`WaitError::Interrupted`] when a [`wait_break`] reaches
    /// this consumer and with [`WaitError::Closed`] once the deque is closed
    /// and empty.
    ///
    /// [`wait_break`]: Self::wait_break
    pub fn pull_front_wait(&self) -> Result<T, WaitError> {
        let mut state = self.state.lock();
        pull_wait(&self.not_empty, &mut state, None)
    }

    /// Like [`pull_front_wait`](Self::pull_front_wait), giving up with
    /// [`WaitError::TimedOut`] once `timeout` has elapsed.
    pub fn pull_front_wait_timeout(&self, timeout: Duration) -> Result<T, WaitError> {
        let deadline = deadline_after(timeout);
        let mut state = self.state.lock();
        pull_wait(&self.not_empty, &mut state, deadline)
    }

    /// Clone of the front element, left in place.
    pub fn try_get_front(&self) -> Option<T>
    where
        T: Clone,
    {
        self.state.lock().items.front().cloned()
    }

    /// Clone of the back element, left in place.
    pub fn try_get_back(&self) -> Option<T>
    where
        T: Clone,
    {
        self.state.lock().items.back().cloned()
    }

    /// Runs `f` on the front element under the lock.
    pub fn peek_front<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.state.lock().items.front().map(f)
    }

    /// Runs `f` on the back element under the lock.
    pub fn peek_back<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.state.lock().items.back().map(f)
    }

    /// Removes the front element and disposes of it per the ownership policy.
    ///
    /// Returns `false` if the deque was empty.
    pub fn pop_front(&self) -> bool {
        let mut state = self.state.lock();
        match state.items.pop_front() {
            Some(item) => {
                state.discard(item);
                true
            }
            None => false,
        }
    }

    /// Removes the back element and disposes of it per the ownership policy.
    ///
    /// Returns `false` if the deque was empty.
    pub fn pop_back(&self) -> bool {
        let mut state = self.state.lock();
        match state.items.pop_back() {
            Some(item) => {
                state.discard(item);
                true
            }
            None => false,
        }
    }

    /// Removes every element, disposing of each per the ownership policy.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let items = std::mem::take(&mut state.items);
        for item in items {
            state.discard(item);
        }
    }

    // ---------------------------------------------------------------------
    // SHUTDOWN
    // ---------------------------------------------------------------------

    /// Wakes one blocked consumer without pushing data.
    ///
    /// The woken consumer reports [`WaitError::Interrupted`] unless it finds
    /// an element. Does nothing when no consumer is blocked.
    pub fn wait_break(&self) {
        let mut state = self.state.lock();
        if state.wait.request_break() {
            debug!(waiting = state.wait.waiting(), "wait_break on deque");
            self.not_empty.notify_one();
        }
    }

    /// Closes the deque for blocking consumers and wakes all of them.
    ///
    /// Queued elements are still delivered; once empty, blocking pulls fail
    /// with [`WaitError::Closed`] instead of waiting. Pushes keep working.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.wait.close();
        debug!(waiting = state.wait.waiting(), "deque closed");
        self.not_empty.notify_all();
    }

    /// Lets blocking pulls wait again after [`close`](Self::close).
    pub fn reopen(&self) {
        self.state.lock().wait.reopen();
    }

    /// Returns true if the deque is closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().wait.is_closed()
    }
}

impl<T> Default for ConcurrentDeque<T> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ConcurrentDeque<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state.try_lock() {
            Some(state) => f
                .debug_struct("ConcurrentDeque")
                .field("items", &state.items)
                .field("waiting", &state.wait.waiting())
                .field("closed", &state.wait.is_closed())
                .finish(),
            None => f.write_str("ConcurrentDeque { <locked> }"),
        }
    }
}
