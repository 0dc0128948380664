//! # TTL Demonstration
//!
//! Insert a key with a 5 second TTL, read it back at 3 s (hit) and at 8 s
//! (pruned by the sweeper). Standalone entry point, not part of the
//! cache's tested surface.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use robin_cache::Cache;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cache: Arc<Cache<Arc<[u8]>>> = Cache::new(16);

    cache
        .put(b"user:123", Arc::from(&b"42"[..]), Some(Duration::from_secs(5)))
        .unwrap();
    tracing::info!("inserted user:123 with a 5s ttl");

    thread::sleep(Duration::from_secs(3));
    match cache.get(b"user:123") {
        Some(value) => println!("at t=3s: {}", String::from_utf8_lossy(&value)),
        None => println!("at t=3s: expired or not found"),
    }

    thread::sleep(Duration::from_secs(5));
    match cache.get(b"user:123") {
        Some(value) => println!("at t=8s: {}", String::from_utf8_lossy(&value)),
        None => println!("at t=8s: expired or not found"),
    }

    cache.destroy();
}
