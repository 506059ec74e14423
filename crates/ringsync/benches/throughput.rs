//! Throughput of the ring buffer and deque, sequential and across threads.
//!
//! Run with: cargo bench -p ringsync --bench throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ringsync::{Config, ConcurrentDeque, ConcurrentRingBuffer, RingBuffer, WaitError};
use std::sync::Arc;
use std::thread;

const MSG_COUNT: u64 = 200_000;

// =============================================================================
// SINGLE-THREADED
// =============================================================================

fn bench_sequential_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");
    group.throughput(Throughput::Elements(MSG_COUNT));

    group.bench_function("ring_push_pull", |b| {
        let mut ring = RingBuffer::new(Config::new(1024));
        b.iter(|| {
            let mut received = 0u64;
            for i in 0..MSG_COUNT {
                ring.push_back_force(black_box(i));
                if ring.is_full() {
                    while let Some(v) = ring.pull_front() {
                        black_box(v);
                        received += 1;
                    }
                }
            }
            while let Some(v) = ring.pull_front() {
                black_box(v);
                received += 1;
            }
            received
        });
    });

    group.bench_function("ring_running_sum", |b| {
        let mut ring = RingBuffer::with_running_sum(Config::new(64));
        b.iter(|| {
            for i in 0..MSG_COUNT {
                ring.push_back_force(black_box(i));
            }
            black_box(ring.sum())
        });
    });

    group.finish();
}

// =============================================================================
// PRODUCER / CONSUMER
// =============================================================================

fn run_ring(producers: u64, capacity: usize) -> u64 {
    let ring = Arc::new(ConcurrentRingBuffer::new(Config::new(capacity)));
    let per_producer = MSG_COUNT / producers;

    let consumer = {
        let ring = Arc::clone(&ring);
        thread::spawn(move || {
            let mut received = 0u64;
            loop {
                match ring.pull_front_wait() {
                    Ok(v) => {
                        black_box(v);
                        received += 1;
                    }
                    Err(WaitError::Closed) => break received,
                    Err(_) => {}
                }
            }
        })
    };

    let handles: Vec<_> = (0..producers)
        .map(|_| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for i in 0..per_producer {
                    let mut item = i;
                    while let Err(full) = ring.push_back_notify(item) {
                        item = full.into_inner();
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    ring.close();
    consumer.join().unwrap()
}

fn run_deque(producers: u64) -> u64 {
    let deque = Arc::new(ConcurrentDeque::new(Config::new(1024)));
    let per_producer = MSG_COUNT / producers;

    let consumer = {
        let deque = Arc::clone(&deque);
        thread::spawn(move || {
            let mut received = 0u64;
            loop {
                match deque.pull_front_wait() {
                    Ok(v) => {
                        black_box(v);
                        received += 1;
                    }
                    Err(WaitError::Closed) => break received,
                    Err(_) => {}
                }
            }
        })
    };

    let handles: Vec<_> = (0..producers)
        .map(|_| {
            let deque = Arc::clone(&deque);
            thread::spawn(move || {
                for i in 0..per_producer {
                    deque.push_back_notify(i);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    deque.close();
    consumer.join().unwrap()
}

fn bench_producer_consumer(c: &mut Criterion) {
    let mut group = c.benchmark_group("producer_consumer");
    group.throughput(Throughput::Elements(MSG_COUNT));
    group.sample_size(20);

    for producers in [1u64, 2, 4] {
        group.bench_with_input(BenchmarkId::new("ring_1024", producers), &producers, |b, &p| {
            b.iter(|| run_ring(p, 1024));
        });
        group.bench_with_input(BenchmarkId::new("deque", producers), &producers, |b, &p| {
            b.iter(|| run_deque(p));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sequential_ring, bench_producer_consumer);
criterion_main!(benches);
