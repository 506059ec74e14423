//! Property-based tests for the ring buffer and deque.
//!
//! Random operation sequences run against the containers and against a
//! `VecDeque` model; after every step the two must agree.

use proptest::prelude::*;
use ringsync::{Config, ConcurrentDeque, ConcurrentRingBuffer, RingBuffer};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum RingOp {
    Push(i64),
    PushForce(i64),
    Pull,
    Clear,
    Fill(i64),
}

fn ring_op() -> impl Strategy<Value = RingOp> {
    prop_oneof![
        4 => (-1000i64..1000).prop_map(RingOp::Push),
        4 => (-1000i64..1000).prop_map(RingOp::PushForce),
        4 => Just(RingOp::Pull),
        1 => Just(RingOp::Clear),
        1 => (-1000i64..1000).prop_map(RingOp::Fill),
    ]
}

#[derive(Debug, Clone)]
enum DequeOp {
    PushBack(u32),
    PushFront(u32),
    PullFront,
    PopFront,
    PopBack,
}

fn deque_op() -> impl Strategy<Value = DequeOp> {
    prop_oneof![
        any::<u32>().prop_map(DequeOp::PushBack),
        any::<u32>().prop_map(DequeOp::PushFront),
        Just(DequeOp::PullFront),
        Just(DequeOp::PopFront),
        Just(DequeOp::PopBack),
    ]
}

// =============================================================================
// Ring buffer agrees with a bounded FIFO model
// =============================================================================

proptest! {
    /// Count stays within capacity, order is FIFO, and the running sum always
    /// equals the sum of the stored elements.
    #[test]
    fn prop_ring_matches_model(
        capacity in 0usize..16,
        ops in prop::collection::vec(ring_op(), 0..200),
    ) {
        let mut ring = RingBuffer::with_running_sum(Config::new(capacity));
        let mut model: VecDeque<i64> = VecDeque::new();

        for op in ops {
            match op {
                RingOp::Push(v) => {
                    let result = ring.push_back(v);
                    if model.len() < capacity {
                        prop_assert!(result.is_ok());
                        model.push_back(v);
                    } else {
                        prop_assert_eq!(result.map_err(|full| full.into_inner()), Err(v));
                    }
                }
                RingOp::PushForce(v) => {
                    ring.push_back_force(v);
                    if capacity > 0 {
                        if model.len() == capacity {
                            model.pop_front();
                        }
                        model.push_back(v);
                    }
                }
                RingOp::Pull => {
                    prop_assert_eq!(ring.pull_front(), model.pop_front());
                }
                RingOp::Clear => {
                    ring.clear();
                    model.clear();
                }
                RingOp::Fill(v) => {
                    ring.fill(v);
                    model = std::iter::repeat(v).take(capacity).collect();
                }
            }

            prop_assert!(ring.len() <= ring.capacity());
            prop_assert_eq!(ring.len(), model.len());
            prop_assert_eq!(ring.front(), model.front());
            prop_assert_eq!(ring.back(), model.back());
            prop_assert_eq!(ring.sum(), model.iter().sum::<i64>());
        }

        prop_assert!(ring.iter().eq(model.iter()));
    }

    /// A refused push leaves contents untouched.
    #[test]
    fn prop_full_push_leaves_buffer_unchanged(
        values in prop::collection::vec(any::<u16>(), 1..32),
        extra in any::<u16>(),
    ) {
        let mut ring = RingBuffer::new(Config::new(values.len()));
        for &v in &values {
            prop_assert!(ring.push_back(v).is_ok());
        }
        prop_assert!(ring.is_full());

        prop_assert!(ring.push_back(extra).is_err());
        prop_assert!(ring.iter().copied().eq(values.iter().copied()));
    }

    /// Forced pushes keep exactly the most recent `capacity` elements.
    #[test]
    fn prop_forced_push_keeps_latest(
        capacity in 1usize..32,
        values in prop::collection::vec(any::<u32>(), 0..128),
    ) {
        let mut ring = RingBuffer::new(Config::new(capacity));
        for &v in &values {
            ring.push_back_force(v);
        }

        let skip = values.len().saturating_sub(capacity);
        prop_assert!(ring.iter().copied().eq(values[skip..].iter().copied()));
        prop_assert_eq!(ring.metrics().evicted, 0, "metrics are off by default");
    }

    /// The concurrent ring behaves like the sequential one on a single thread.
    #[test]
    fn prop_concurrent_ring_non_blocking_ops(
        capacity in 1usize..16,
        ops in prop::collection::vec(ring_op(), 0..100),
    ) {
        let concurrent = ConcurrentRingBuffer::new(Config::new(capacity));
        let mut sequential = RingBuffer::new(Config::new(capacity));

        for op in ops {
            match op {
                RingOp::Push(v) => {
                    prop_assert_eq!(concurrent.push_back(v).is_ok(), sequential.push_back(v).is_ok());
                }
                RingOp::PushForce(v) => {
                    concurrent.push_back_force(v);
                    sequential.push_back_force(v);
                }
                RingOp::Pull => {
                    prop_assert_eq!(concurrent.pull_front(), sequential.pull_front());
                }
                RingOp::Clear => {
                    concurrent.clear();
                    sequential.clear();
                }
                RingOp::Fill(v) => {
                    concurrent.fill(v);
                    sequential.fill(v);
                }
            }
            prop_assert_eq!(concurrent.len(), sequential.len());
        }

        let drained = concurrent.into_ring();
        prop_assert!(drained.iter().eq(sequential.iter()));
    }
}

// =============================================================================
// Deque agrees with VecDeque
// =============================================================================

proptest! {
    #[test]
    fn prop_deque_matches_model(ops in prop::collection::vec(deque_op(), 0..200)) {
        let deque = ConcurrentDeque::new(Config::new(4));
        let mut model: VecDeque<u32> = VecDeque::new();

        for op in ops {
            match op {
                DequeOp::PushBack(v) => {
                    deque.push_back(v);
                    model.push_back(v);
                }
                DequeOp::PushFront(v) => {
                    deque.push_front(v);
                    model.push_front(v);
                }
                DequeOp::PullFront => {
                    prop_assert_eq!(deque.pull_front(), model.pop_front());
                }
                DequeOp::PopFront => {
                    prop_assert_eq!(deque.pop_front(), model.pop_front().is_some());
                }
                DequeOp::PopBack => {
                    prop_assert_eq!(deque.pop_back(), model.pop_back().is_some());
                }
            }

            prop_assert_eq!(deque.len(), model.len());
            prop_assert_eq!(deque.try_get_front(), model.front().copied());
            prop_assert_eq!(deque.try_get_back(), model.back().copied());
        }
    }
}
