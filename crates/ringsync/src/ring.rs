use crate::invariants::{debug_assert_cursors, debug_assert_no_overrun, debug_assert_no_underrun};
use crate::metrics::Metrics;
use crate::sum::{Accumulator, NoSum, RunningSum, Summable};
use crate::{Config, Full, MetricsSnapshot, Ownership};
use tracing::trace;

/// Fixed-capacity circular buffer - the single-threaded building block.
///
/// Elements are pushed at the back and pulled from the front in FIFO order.
/// The storage is allocated once at construction and never grows. When full,
/// [`push_back`](Self::push_back) refuses the element while
/// [`push_back_force`](Self::push_back_force) evicts the oldest one.
///
/// `S` selects sum tracking: [`NoSum`] (default) or [`RunningSum<T>`], which
/// keeps `sum() == Σ live elements` after every mutating operation.
///
/// # Example
///
/// ```
/// use ringsync::{Config, RingBuffer};
///
/// let mut ring = RingBuffer::with_running_sum(Config::new(4));
/// for i in 1..=4 {
///     ring.push_back(i).unwrap();
/// }
/// assert!(ring.push_back(5).is_err());
///
/// ring.push_back_force(5);
/// assert_eq!(ring.sum(), 2 + 3 + 4 + 5);
/// assert_eq!(ring.pull_front(), Some(2));
/// ```
pub struct RingBuffer<T, S = NoSum> {
    /// Slot storage. A slot is `Some` exactly when it holds a live element.
    slots: Box<[Option<T>]>,
    /// Index of the oldest element
    front: usize,
    /// Index the next push writes to
    back: usize,
    len: usize,
    ownership: Ownership,
    sum: S,
    metrics: Metrics,
}

impl<T> RingBuffer<T, NoSum> {
    /// Creates an empty ring buffer without sum tracking.
    pub fn new(config: Config) -> Self {
        Self::with_accumulator(config, NoSum)
    }
}

impl<T> RingBuffer<T, RunningSum<T>>
where
    T: Summable,
{
    /// Creates an empty ring buffer that tracks the sum of its elements.
    pub fn with_running_sum(config: Config) -> Self {
        Self::with_accumulator(config, RunningSum::default())
    }

    /// Sum of the elements currently held.
    #[inline]
    pub fn sum(&self) -> T {
        self.sum.total()
    }
}

impl<T, S: Accumulator<T>> RingBuffer<T, S> {
    /// Creates an empty ring buffer with a custom accumulator.
    pub fn with_accumulator(config: Config, sum: S) -> Self {
        let mut slots = Vec::with_capacity(config.capacity);
        slots.resize_with(config.capacity, || None);

        Self {
            slots: slots.into_boxed_slice(),
            front: 0,
            back: 0,
            len: 0,
            ownership: config.ownership,
            sum,
            metrics: Metrics::new(config.enable_metrics),
        }
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if every slot is occupied. A zero-capacity buffer is
    /// always full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Returns the ownership policy chosen at construction.
    #[inline]
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Oldest element, the next one [`pull_front`](Self::pull_front) returns.
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.front].as_ref()
    }

    /// Most recently pushed element.
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let last = (self.back + self.capacity() - 1) % self.capacity();
        self.slots[last].as_ref()
    }

    /// Iterates over the live elements from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.slots[(self.front + i) % capacity].as_ref())
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    #[inline]
    pub(crate) fn metrics_mut(&mut self) -> &mut Metrics {
        &mut self.metrics
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Appends an element at the back.
    ///
    /// Returns the element inside [`Full`] if the buffer is full; the buffer
    /// is left unchanged.
    pub fn push_back(&mut self, item: T) -> Result<(), Full<T>> {
        if self.is_full() {
            self.metrics.add_rejected();
            return Err(Full(item));
        }
        self.incr_back(item);
        Ok(())
    }

    /// Appends an element at the back, evicting the front element if full.
    ///
    /// The evicted element is disposed of per the ownership policy. Never
    /// fails; on a zero-capacity buffer the pushed element itself is disposed.
    pub fn push_back_force(&mut self, item: T) {
        if self.capacity() == 0 {
            self.metrics.add_evicted(1);
            self.ownership.dispose(item);
            return;
        }
        if self.is_full() {
            if let Some(evicted) = self.incr_front() {
                trace!(capacity = self.capacity(), "ring buffer full, evicting front element");
                self.metrics.add_evicted(1);
                self.ownership.dispose(evicted);
            }
        }
        self.incr_back(item);
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Removes and returns the front element, or `None` if empty.
    pub fn pull_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.incr_front();
        if item.is_some() {
            self.metrics.add_pulled();
        }
        item
    }

    // ---------------------------------------------------------------------
    // BULK
    // ---------------------------------------------------------------------

    /// Sets every slot to a clone of `value`, making the buffer full.
    ///
    /// Elements held before the call are disposed of per the ownership policy.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.discard_all();

        let capacity = self.capacity();
        if capacity == 0 {
            self.ownership.dispose(value);
            return;
        }

        for slot in &mut self.slots[..capacity - 1] {
            let item = value.clone();
            self.sum.add(&item);
            *slot = Some(item);
        }
        self.sum.add(&value);
        self.slots[capacity - 1] = Some(value);

        self.front = 0;
        self.back = 0;
        self.len = capacity;
        debug_assert_cursors!(self.front, self.back, self.len, capacity);
    }

    /// Empties the buffer and resets both cursors.
    ///
    /// Elements held before the call are disposed of per the ownership policy.
    pub fn clear(&mut self) {
        self.discard_all();
        self.front = 0;
        self.back = 0;
    }

    // ---------------------------------------------------------------------
    // INTERNALS
    // ---------------------------------------------------------------------

    /// Writes at the back cursor and advances it. Caller checked not full.
    fn incr_back(&mut self, item: T) {
        let capacity = self.capacity();
        debug_assert_no_overrun!(self.len, capacity);
        debug_assert!(self.slots[self.back].is_none(), "back slot still occupied");

        self.sum.add(&item);
        self.slots[self.back] = Some(item);
        self.back = (self.back + 1) % capacity;
        self.len += 1;
        self.metrics.add_pushed();

        debug_assert_cursors!(self.front, self.back, self.len, capacity);
    }

    /// Takes the front slot and advances the front cursor. Caller checked
    /// not empty.
    fn incr_front(&mut self) -> Option<T> {
        let capacity = self.capacity();
        debug_assert_no_underrun!(self.len);

        let item = self.slots[self.front].take()?;
        self.sum.sub(&item);
        self.front = (self.front + 1) % capacity;
        self.len -= 1;

        debug_assert_cursors!(self.front, self.back, self.len, capacity);
        Some(item)
    }

    /// Disposes of every live element.
    fn discard_all(&mut self) {
        let discarded = self.len as u64;
        while !self.is_empty() {
            match self.incr_front() {
                Some(item) => self.ownership.dispose(item),
                None => break,
            }
        }
        self.sum.reset();
        self.metrics.add_evicted(discarded);
    }
}

impl<T, S> Drop for RingBuffer<T, S> {
    fn drop(&mut self) {
        if self.len > 0 {
            trace!(remaining = self.len, ownership = ?self.ownership, "dropping ring buffer");
        }
        // Owned elements drop with the slots; detached ones must not.
        if self.ownership == Ownership::Detached {
            for item in self.slots.iter_mut().filter_map(Option::take) {
                std::mem::forget(item);
            }
        }
    }
}

impl<T: std::fmt::Debug, S> std::fmt::Debug for RingBuffer<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let capacity = self.slots.len();
        let live = (0..self.len).filter_map(|i| self.slots[(self.front + i) % capacity].as_ref());
        f.debug_struct("RingBuffer")
            .field("capacity", &capacity)
            .field("len", &self.len)
            .field("elements", &DebugList(live))
            .finish()
    }
}

struct DebugList<I>(I);

impl<I> std::fmt::Debug for DebugList<I>
where
    I: Iterator + Clone,
    I::Item: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.clone()).finish()
    }
}
