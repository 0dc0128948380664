//! # Cache Benchmark Harness
//!
//! Throughput driver: 1,000,000 put/get iterations against a 10,000-entry
//! cache, run as a dependency-free, repeatable workload. Not part of the
//! cache's tested surface — this is a standalone entry point.
//!
//! ## Design Principles
//! 1. **Deterministic Workload**: fixed PRNG seeds for stable comparisons.
//! 2. **Allocation Control**: pre-build keys before timing the hot loop.
//! 3. **Zero-Cost Dispatch**: call the concrete `Cache` directly.

use std::env;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use robin_cache::Cache;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ITEM_COUNT: usize = 10_000;
const DEFAULT_OP_COUNT: usize = 1_000_000;

struct BenchConfig {
    item_count: usize,
    op_count: usize,
}

impl BenchConfig {
    fn from_args() -> Self {
        let mut args = env::args().skip(1);
        BenchConfig {
            item_count: parse_usize(args.next(), DEFAULT_ITEM_COUNT),
            op_count: parse_usize(args.next(), DEFAULT_OP_COUNT),
        }
    }
}

fn parse_usize(value: Option<String>, fallback: usize) -> usize {
    value.and_then(|raw| raw.parse().ok()).unwrap_or(fallback)
}

/// Tiny deterministic PRNG used to avoid external dependencies.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    #[inline]
    fn next_index(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}

fn report(label: &str, ops: usize, elapsed: std::time::Duration) {
    let secs = elapsed.as_secs_f64();
    let ops_per_sec = (ops as f64) / secs;
    let nanos_per_op = (secs * 1e9) / (ops as f64);
    println!("{label}: {ops} ops in {secs:.3}s ({ops_per_sec:.0} ops/s, {nanos_per_op:.1} ns/op)");
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BenchConfig::from_args();
    tracing::info!(items = config.item_count, ops = config.op_count, "starting benchmark");
    let cache: Arc<Cache<Arc<[u8]>>> = Cache::new(config.item_count);

    let keys: Vec<Vec<u8>> = (0..config.item_count)
        .map(|i| format!("item{i}").into_bytes())
        .collect();
    let values: Vec<Arc<[u8]>> = (0..config.item_count)
        .map(|i| Arc::from(format!("value-{i}").into_bytes().into_boxed_slice()))
        .collect();

    for (key, value) in keys.iter().zip(values.iter()) {
        cache.put(key, Arc::clone(value), None).unwrap();
    }

    println!(
        "items: {}, ops: {}",
        config.item_count, config.op_count
    );

    let mut rng = XorShift64::new(0x1234_5678_9ABC_DEF0);
    let start = Instant::now();
    for _ in 0..config.op_count {
        let idx = rng.next_index(config.item_count);
        let value = cache.get(&keys[idx]);
        black_box(value);
    }
    report("GET", config.op_count, start.elapsed());

    let mut rng = XorShift64::new(0x0FED_CBA9_8765_4321);
    let start = Instant::now();
    for _ in 0..config.op_count {
        let idx = rng.next_index(config.item_count);
        cache.put(&keys[idx], Arc::clone(&values[idx]), None).unwrap();
    }
    report("PUT", config.op_count, start.elapsed());

    cache.destroy();
}
