//! Capture-to-processing pipeline.
//!
//! A capture thread fills frames borrowed from a recycling pool and hands
//! them to a processing thread through a bounded ring. Finished frames drop
//! back into the pool, so after warm-up no frame is allocated.
//!
//! Run with: RUST_LOG=ringsync=debug cargo run -p ringsync --example pipeline

use ringsync::{
    ConcurrentDeque, ConcurrentRingBuffer, Recycled, WaitError, POOL_CONFIG, SENSOR_FRAME_CONFIG,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAMES: u64 = 10_000;
const SAMPLES_PER_FRAME: usize = 256;

#[derive(Default)]
struct Frame {
    seq: u64,
    samples: Vec<u16>,
}

type FramePool = ConcurrentDeque<Box<Frame>>;
type FrameHandle = Recycled<Arc<FramePool>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("ringsync Pipeline Example");
    println!("=========================\n");

    let pool = Arc::new(FramePool::new(POOL_CONFIG));
    let queue: Arc<ConcurrentRingBuffer<FrameHandle>> =
        Arc::new(ConcurrentRingBuffer::new(SENSOR_FRAME_CONFIG.with_metrics(true)));

    println!("Configuration:");
    println!("  Queue capacity: {} frames", queue.capacity());
    println!("  Frames: {}", FRAMES);
    println!("  Samples per frame: {}\n", SAMPLES_PER_FRAME);

    let start = Instant::now();

    let processing = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut processed = 0u64;
            let mut checksum = 0u64;
            let mut last_seq = None;
            loop {
                match queue.pull_front_wait_timeout(Duration::from_millis(250)) {
                    Ok(frame) => {
                        if let Some(last) = last_seq {
                            assert!(frame.seq > last, "frames out of order");
                        }
                        last_seq = Some(frame.seq);
                        checksum += frame.samples.iter().map(|&s| u64::from(s)).sum::<u64>();
                        processed += 1;
                    }
                    Err(WaitError::Closed) => break,
                    Err(e) => info!(error = %e, "processing idle"),
                }
            }
            (processed, checksum)
        })
    };

    let mut fresh = 0u64;
    for seq in 0..FRAMES {
        let mut frame = pool.borrow_arc();
        if !frame.was_recycled() {
            fresh += 1;
        }
        frame.seq = seq;
        frame.samples.clear();
        frame
            .samples
            .extend((0..SAMPLES_PER_FRAME).map(|i| ((seq as usize + i) % 4096) as u16));

        // A slow consumer loses the oldest frame rather than stalling capture
        queue.push_back_force_notify(frame);
    }
    queue.close();

    let (processed, checksum) = processing.join().unwrap();
    let elapsed = start.elapsed();
    let metrics = queue.metrics();

    println!("Results:");
    println!("  Processed: {} frames ({} dropped)", processed, metrics.evicted);
    println!("  Frames allocated: {}", fresh);
    println!("  Frames pooled: {}", pool.len());
    println!("  Checksum: {}", checksum);
    println!("  Duration: {:?}", elapsed);
    println!(
        "  Throughput: {:.2} frames/sec",
        processed as f64 / elapsed.as_secs_f64()
    );
}
