//! Error types for container operations.
//!
//! Full and empty are ordinary conditions, so pushes hand the rejected value
//! back and non-blocking pulls return `Option`. Only blocking pulls need to say
//! why they came back empty-handed.

use std::fmt;
use thiserror::Error;

/// A bounded buffer was full. The rejected value is returned to the caller.
#[derive(Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer is full")]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Takes back the value that could not be pushed.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Full(..)")
    }
}

/// Why a blocking pull returned without an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    /// The timeout elapsed while the container stayed empty.
    #[error("wait timed out")]
    TimedOut,

    /// A `wait_break` woke this consumer while the container was empty.
    #[error("wait interrupted by wait_break")]
    Interrupted,

    /// The container was closed and is empty.
    #[error("container is closed")]
    Closed,

    /// The ring buffer has no slots, so no element can ever arrive.
    #[error("ring buffer has zero capacity")]
    ZeroCapacity,
}

impl WaitError {
    /// Returns `true` if the wait simply ran out of time.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    /// Returns `true` if no element will ever arrive for this waiter.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::ZeroCapacity)
    }
}
