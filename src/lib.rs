//! Merkurius - Ultra Low-Latency SPSC Event Pipeline Benchmark Harness
//!
//! Arsitektur:
//! - Lock-Free: Ring buffer SPSC atomic-only, tanpa Mutex
//! - No-Allocation: Semua storage pre-allocated, hot path bebas alokasi
//! - Cache-Aware: Padding cache line untuk index producer/consumer
//! - Tail Latency: Sampling ring-semantics + percentile p50/p99/p99.9
//!
//! Pipeline: producer mensintesis `Event` (sequence + timestamp enqueue)
//! -> `RingBuffer` -> consumer menghitung latency, feed ke
//! `LatencyTracker`, dan memvalidasi urutan FIFO. `EventBus`
//! mengorkestrasi lifecycle kedua thread.

pub mod bus;
pub mod core;

pub use bus::{Counters, EventBus};
pub use core::{Event, EventKind, LatencyTracker, RingBuffer, Side, Stats};
