use crate::metrics::Metrics;
use crate::ring::RingBuffer;
use crate::sum::{Accumulator, NoSum, RunningSum, Summable};
use crate::waiter::{deadline_after, pull_wait, WaitState, Waitable};
use crate::{Config, Full, MetricsSnapshot, Ownership, WaitError};
use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// =============================================================================
// SYNCHRONIZATION STRATEGY
// =============================================================================
//
// One mutex guards the ring (storage, cursors, len, running sum, metrics) and
// the waiter bookkeeping. Every public method takes the lock for the whole
// call through a scoped guard, so each operation is a single atomic step and
// the lock is released on every exit path.
//
// One condition variable (`not_empty`) carries three kinds of wake-up:
// - `*_notify` pushes wake one waiter after storing an element
// - `wait_break()` wakes one waiter after depositing a break token
// - `close()` wakes all waiters
//
// Plain `push_back`/`push_back_force` do not notify. A consumer blocked in
// `pull_front_wait` without a timeout only sees such elements at its next
// wake-up.
//
// =============================================================================

/// Thread-safe fixed-capacity circular buffer with blocking pulls.
///
/// Same storage and overwrite behavior as [`RingBuffer`], shared between
/// producer and consumer threads through `&self`.
///
/// # Example
///
/// ```
/// use ringsync::{Config, ConcurrentRingBuffer};
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
///
/// let ring = Arc::new(ConcurrentRingBuffer::new(Config::new(16)));
///
/// let consumer = {
///     let ring = Arc::clone(&ring);
///     thread::spawn(move || ring.pull_front_wait_timeout(Duration::from_secs(5)))
/// };
///
/// ring.push_back_notify(42u32).unwrap();
/// assert_eq!(consumer.join().unwrap(), Ok(42));
/// ```
pub struct ConcurrentRingBuffer<T, S = NoSum> {
    state: CachePadded<Mutex<RingState<T, S>>>,
    not_empty: Condvar,
}

struct RingState<T, S> {
    ring: RingBuffer<T, S>,
    wait: WaitState,
}

impl<T, S: Accumulator<T>> Waitable for RingState<T, S> {
    type Item = T;

    #[inline]
    fn take_front(&mut self) -> Option<T> {
        self.ring.pull_front()
    }

    #[inline]
    fn wait_state(&mut self) -> &mut WaitState {
        &mut self.wait
    }

    #[inline]
    fn metrics_mut(&mut self) -> &mut Metrics {
        self.ring.metrics_mut()
    }
}

impl<T> ConcurrentRingBuffer<T, NoSum> {
    /// Creates an empty buffer without sum tracking.
    pub fn new(config: Config) -> Self {
        Self::from_ring(RingBuffer::new(config))
    }
}

impl<T> ConcurrentRingBuffer<T, RunningSum<T>>
where
    T: Summable,
{
    /// Creates an empty buffer that tracks the sum of its elements.
    pub fn with_running_sum(config: Config) -> Self {
        Self::from_ring(RingBuffer::with_running_sum(config))
    }

    /// Sum of the elements currently held.
    pub fn sum(&self) -> T {
        self.state.lock().ring.sum()
    }
}

impl<T, S: Accumulator<T>> ConcurrentRingBuffer<T, S> {
    /// Wraps an existing ring buffer, keeping its contents.
    pub fn from_ring(ring: RingBuffer<T, S>) -> Self {
        Self {
            state: CachePadded::new(Mutex::new(RingState {
                ring,
                wait: WaitState::default(),
            })),
            not_empty: Condvar::new(),
        }
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.state.lock().ring.capacity()
    }

    /// Returns the current number of elements.
    pub fn len(&self) -> usize {
        self.state.lock().ring.len()
    }

    /// Returns true if the buffer holds no element.
    pub fn is_empty(&self) -> bool {
        self.state.lock().ring.is_empty()
    }

    /// Returns true if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.state.lock().ring.is_full()
    }

    /// Returns the ownership policy chosen at construction.
    pub fn ownership(&self) -> Ownership {
        self.state.lock().ring.ownership()
    }

    /// Number of consumers currently blocked in a blocking pull.
    pub fn waiting(&self) -> usize {
        self.state.lock().wait.waiting()
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.state.lock().ring.metrics()
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Appends an element without waking any consumer.
    ///
    /// Returns the element inside [`Full`] if the buffer is full.
    pub fn push_back(&self, item: T) -> Result<(), Full<T>> {
        self.state.lock().ring.push_back(item)
    }

    /// Appends an element, evicting the oldest one if full. Wakes nobody.
    pub fn push_back_force(&self, item: T) {
        self.state.lock().ring.push_back_force(item);
    }

    /// Appends an element and, on success, wakes one blocked consumer.
    pub fn push_back_notify(&self, item: T) -> Result<(), Full<T>> {
        let mut state = self.state.lock();
        state.ring.push_back(item)?;
        self.not_empty.notify_one();
        Ok(())
    }

    /// Appends an element, evicting the oldest one if full, and wakes one
    /// blocked consumer.
    pub fn push_back_force_notify(&self, item: T) {
        let mut state = self.state.lock();
        state.ring.push_back_force(item);
        self.not_empty.notify_one();
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Removes and returns the front element without blocking.
    pub fn pull_front(&self) -> Option<T> {
        self.state.lock().ring.pull_front()
    }

    /// Removes and returns the front element, blocking while empty.
    ///
    /// Fails with [`WaitError::Interrupted`] when a [`wait_break`] reaches
    /// this consumer and with [`WaitError::Closed`] once the buffer is closed
    /// and empty.
    ///
    /// A zero-capacity buffer fails at once with [`WaitError::ZeroCapacity`].
    ///
    /// [`wait_break`]: Self::wait_break
    pub fn pull_front_wait(&self) -> Result<T, WaitError> {
        self.pull_blocking(None)
    }

    /// Like [`pull_front_wait`](Self::pull_front_wait), giving up with
    /// [`WaitError::TimedOut`] once `timeout` has elapsed.
    pub fn pull_front_wait_timeout(&self, timeout: Duration) -> Result<T, WaitError> {
        self.pull_blocking(deadline_after(timeout))
    }

    fn pull_blocking(&self, deadline: Option<Instant>) -> Result<T, WaitError> {
        let mut state = self.state.lock();
        // Forced pushes dispose of their value at zero capacity; nothing to wait for
        if state.ring.capacity() == 0 {
            trace!("blocking pull on a zero-capacity ring buffer");
            return Err(WaitError::ZeroCapacity);
        }
        pull_wait(&self.not_empty, &mut state, deadline)
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
            debug!(waiting = state.wait.waiting(), "wait_break on ring buffer");
            self.not_empty.notify_one();
        }
    }

    /// Closes the buffer for blocking consumers and wakes all of them.
    ///
    /// Queued elements are still delivered; once empty, blocking pulls fail
    /// with [`WaitError::Closed`] instead of waiting. Pushes keep working.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.wait.close();
        debug!(waiting = state.wait.waiting(), "ring buffer closed");
        self.not_empty.notify_all();
    }

    /// Lets blocking pulls wait again after [`close`](Self::close).
    pub fn reopen(&self) {
        self.state.lock().wait.reopen();
    }

    /// Returns true if the buffer is closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().wait.is_closed()
    }

    // ---------------------------------------------------------------------
    // BULK
    // ---------------------------------------------------------------------

    /// Sets every slot to a clone of `value`. See [`RingBuffer::fill`].
    pub fn fill(&self, value: T)
    where
        T: Clone,
    {
        self.state.lock().ring.fill(value);
    }

    /// Empties the buffer. See [`RingBuffer::clear`].
    pub fn clear(&self) {
        self.state.lock().ring.clear();
    }

    /// Consumes the wrapper and returns the inner ring buffer.
    pub fn into_ring(self) -> RingBuffer<T, S> {
        CachePadded::into_inner(self.state).into_inner().ring
    }
}

impl<T, S> std::fmt::Debug for ConcurrentRingBuffer<T, S>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state.try_lock() {
            Some(state) => f
                .debug_struct("ConcurrentRingBuffer")
                .field("ring", &state.ring)
                .field("waiting", &state.wait.waiting())
                .field("closed", &state.wait.is_closed())
                .finish(),
            None => f.write_str("ConcurrentRingBuffer { <locked> }"),
        }
    }
}
