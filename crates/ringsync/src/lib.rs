//! ringsync - queue containers for producer/consumer threads
//!
//! A small family of generic containers used as the synchronization backbone
//! between threads, e.g. handing buffered sensor or IO data from a capture
//! thread to a processing thread.
//!
//! - [`RingBuffer`]: single-threaded fixed-capacity circular buffer with
//!   optional running-sum tracking
//! - [`ConcurrentRingBuffer`]: the same buffer behind one mutex, adding
//!   blocking pulls with optional timeout, notifying pushes and `wait_break`
//! - [`ConcurrentDeque`]: unbounded double-ended queue with the same blocking
//!   contract
//! - [`Recycled`]: scoped borrow/return handle turning any of the above into
//!   an object pool
//!
//! Each container owns exactly one lock and one condition variable; there is
//! no lock-free path. What a container does with elements it discards on its
//! own (evicted, cleared, left over at drop) is chosen at construction by
//! [`Ownership`].
//!
//! # Example
//!
//! ```
//! use ringsync::{Config, ConcurrentRingBuffer, WaitError};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let ring = Arc::new(ConcurrentRingBuffer::new(Config::new(64)));
//!
//! let consumer = {
//!     let ring = Arc::clone(&ring);
//!     thread::spawn(move || {
//!         let mut total = 0u64;
//!         loop {
//!             match ring.pull_front_wait() {
//!                 Ok(sample) => total += sample,
//!                 Err(WaitError::Closed) => break total,
//!                 Err(_) => continue,
//!             }
//!         }
//!     })
//! };
//!
//! for sample in 1..=10u64 {
//!     ring.push_back_force_notify(sample);
//! }
//! ring.close();
//!
//! assert_eq!(consumer.join().unwrap(), 55);
//! ```

mod config;
mod error;
mod global;
mod invariants;
mod metrics;
mod recycle;
mod ring;
mod safe_deque;
mod safe_ring;
mod sum;
mod waiter;

pub use config::{Config, Ownership, POOL_CONFIG, SENSOR_FRAME_CONFIG};
pub use error::{Full, WaitError};
pub use global::Global;
pub use metrics::MetricsSnapshot;
pub use recycle::{RecyclePool, Recycled};
pub use ring::RingBuffer;
pub use safe_deque::ConcurrentDeque;
pub use safe_ring::ConcurrentRingBuffer;
pub use sum::{Accumulator, NoSum, RunningSum, Summable};
