//! Debug assertion macros for container invariants.
//!
//! Overrun and underrun can only happen through an internal path that skipped
//! its full/empty check, so they are programming errors. The checks are only
//! active in debug builds (`#[cfg(debug_assertions)]`), so there is zero
//! overhead in release builds.
//!
//! Used by `RingBuffer<T, S>` and `WaitState`.

// =============================================================================
// Bounded count
// =============================================================================

/// Assert that a write never lands on a full buffer.
///
/// **Invariant**: `len < capacity` before a slot is written
///
/// Used in: `RingBuffer::incr_back()`
macro_rules! debug_assert_no_overrun {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len < $capacity,
            "ring buffer overrun: writing with len {} at capacity {}",
            $len,
            $capacity
        )
    };
}

/// Assert that a read never happens on an empty buffer.
///
/// **Invariant**: `len > 0` before a slot is taken
///
/// Used in: `RingBuffer::incr_front()`
macro_rules! debug_assert_no_underrun {
    ($len:expr) => {
        debug_assert!($len > 0, "ring buffer underrun: reading from an empty buffer")
    };
}

// =============================================================================
// Cursor placement
// =============================================================================

/// Assert that the back cursor sits exactly `len` slots after the front cursor.
///
/// **Invariant**: `back == (front + len) % capacity`
///
/// Used in: after every cursor update in `RingBuffer`
macro_rules! debug_assert_cursors {
    ($front:expr, $back:expr, $len:expr, $capacity:expr) => {
        debug_assert!(
            $capacity == 0 || $back == ($front + $len) % $capacity,
            "ring buffer cursors out of step: front {} back {} len {} capacity {}",
            $front,
            $back,
            $len,
            $capacity
        )
    };
}

// =============================================================================
// Wait-break tokens
// =============================================================================

/// Assert that pending wait-break tokens never outnumber blocked waiters.
///
/// **Invariant**: `breaks ≤ waiting`
///
/// Used in: `WaitState` after a waiter leaves and after `wait_break()`
macro_rules! debug_assert_breaks_bounded {
    ($breaks:expr, $waiting:expr) => {
        debug_assert!(
            $breaks <= $waiting,
            "{} pending wait-break tokens for only {} waiters",
            $breaks,
            $waiting
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_breaks_bounded;
pub(crate) use debug_assert_cursors;
pub(crate) use debug_assert_no_overrun;
pub(crate) use debug_assert_no_underrun;
