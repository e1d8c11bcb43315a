//! Core module: Lock-Free Ring Buffer + Latency Tracker + Event payload
//!
//! Prinsip desain:
//! - Lock-Free: Hanya atomic operations, tidak ada Mutex/RwLock
//! - No-Allocation: Semua buffer pre-allocated saat init
//! - Cache-Aware: Index producer/consumer di cache line terpisah

mod event;
mod latency_tracker;
mod ring_buffer;

pub use event::{Event, EventKind, Side};
pub use latency_tracker::{LatencyTracker, Stats};
pub use ring_buffer::RingBuffer;
