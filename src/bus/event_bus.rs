//! Event Bus - orchestrator pipeline SPSC
//!
//! Memiliki satu `RingBuffer<Event>` dan satu `LatencyTracker`, lalu
//! menjalankan tepat satu producer thread dan satu consumer thread per
//! run aktif. Kedua loop busy-polling tanpa backoff - tradeoff sadar
//! untuk latency: CPU burn ditukar dengan jalur data bebas blocking.
//!
//! Lifecycle: idle -> running -> idle, via `start`/`join`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::core::{Event, LatencyTracker, RingBuffer, Stats};

/// Counter diagnostik per run
///
/// Setiap field ditulis oleh tepat satu thread (producer atau consumer)
/// dengan `Ordering::Relaxed` - tidak ada sinkronisasi yang melindunginya
/// selama run. Precondition terdokumentasi: hanya bermakna dibaca
/// setelah `join()` selesai.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub produced: u64,
    pub consumed: u64,
    pub push_fail_spins: u64,
    pub pop_fail_spins: u64,
    pub seq_mismatch: u64,
}

/// State yang dipegang bersama oleh kedua thread dan control thread.
/// Ring buffer adalah satu-satunya state yang disentuh kedua loop;
/// counter masing-masing single-writer.
struct Shared {
    ring: RingBuffer<Event>,
    stop: AtomicBool,
    running: AtomicBool,
    produced: AtomicU64,
    consumed: AtomicU64,
    push_fail_spins: AtomicU64,
    pop_fail_spins: AtomicU64,
    seq_mismatch: AtomicU64,
}

/// Event bus SPSC dengan pengukuran latency end-to-end
///
/// `LatencyTracker` tidak di-share: saat `start()` dia pindah (move) ke
/// consumer thread, dan kembali lewat return value `JoinHandle` saat
/// `join()`. Ownership meng-encode kontrak single-writer-nya - tidak
/// ada cara membaca stats di tengah run.
pub struct EventBus {
    shared: Arc<Shared>,
    // Ada saat idle; None selama run (dipinjam consumer thread)
    latency: Option<LatencyTracker>,
    producer: Option<JoinHandle<()>>,
    consumer: Option<JoinHandle<LatencyTracker>>,
}

impl EventBus {
    /// `ring_capacity` dibulatkan ke power of 2 (minimum 2);
    /// `max_latency_samples` adalah kapasitas sample store (> 0).
    pub fn new(ring_capacity: usize, max_latency_samples: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                ring: RingBuffer::new(ring_capacity),
                stop: AtomicBool::new(false),
                running: AtomicBool::new(false),
                produced: AtomicU64::new(0),
                consumed: AtomicU64::new(0),
                push_fail_spins: AtomicU64::new(0),
                pop_fail_spins: AtomicU64::new(0),
                seq_mismatch: AtomicU64::new(0),
            }),
            latency: Some(LatencyTracker::new(max_latency_samples)),
            producer: None,
            consumer: None,
        }
    }

    /// Mulai run baru. No-op jika sudah running (idempotent).
    ///
    /// `target_events == 0` berarti unbounded: jalan sampai `stop()`.
    /// Selain itu producer berhenti sendiri setelah memproduksi tepat
    /// `target_events` event.
    pub fn start(&mut self, target_events: u64) {
        if self.shared.running.load(Ordering::Acquire) {
            return;
        }

        // Reset state run sebelumnya
        self.shared.stop.store(false, Ordering::Release);
        self.shared.running.store(true, Ordering::Release);
        self.shared.produced.store(0, Ordering::Relaxed);
        self.shared.consumed.store(0, Ordering::Relaxed);
        self.shared.push_fail_spins.store(0, Ordering::Relaxed);
        self.shared.pop_fail_spins.store(0, Ordering::Relaxed);
        self.shared.seq_mismatch.store(0, Ordering::Relaxed);

        let mut tracker = self
            .latency
            .take()
            .expect("latency tracker present while idle");
        tracker.reset();

        let shared = Arc::clone(&self.shared);
        self.producer = Some(thread::spawn(move || {
            producer_loop(&shared, target_events);
        }));

        let shared = Arc::clone(&self.shared);
        self.consumer = Some(thread::spawn(move || {
            consumer_loop(&shared, &mut tracker);
            tracker
        }));
    }

    /// Minta berhenti secara kooperatif. Tidak blocking; producer
    /// menghormatinya di iterasi berikutnya, consumer setelah buffer
    /// terkuras habis - `stop()` lalu `join()` lossless.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::Release);
    }

    /// Tunggu kedua thread selesai. Aman dipanggil saat tidak ada
    /// thread yang jalan (no-op). Tracker kembali ke bus di sini.
    pub fn join(&mut self) {
        if let Some(handle) = self.producer.take() {
            handle.join().ok();
        }
        if let Some(handle) = self.consumer.take() {
            if let Ok(tracker) = handle.join() {
                self.latency = Some(tracker);
            }
        }

        self.shared.running.store(false, Ordering::Release);
    }

    /// Komposisi `stop()` + `join()`
    pub fn stop_and_join(&mut self) {
        self.stop();
        self.join();
    }

    /// Apakah sedang ada run aktif
    pub fn running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Snapshot statistik latency. Bermakna hanya setelah `join()`;
    /// selama run aktif returns `Stats` zero.
    pub fn latency_stats(&self) -> Stats {
        self.latency
            .as_ref()
            .map(LatencyTracker::compute)
            .unwrap_or_default()
    }

    /// Snapshot counter. Bermakna hanya setelah `join()`.
    pub fn counters(&self) -> Counters {
        Counters {
            produced: self.shared.produced.load(Ordering::Relaxed),
            consumed: self.shared.consumed.load(Ordering::Relaxed),
            push_fail_spins: self.shared.push_fail_spins.load(Ordering::Relaxed),
            pop_fail_spins: self.shared.pop_fail_spins.load(Ordering::Relaxed),
            seq_mismatch: self.shared.seq_mismatch.load(Ordering::Relaxed),
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn producer_loop(shared: &Shared, target_events: u64) {
    let mut seq = 0u64;

    while !shared.stop.load(Ordering::Acquire) {
        if target_events != 0 && seq >= target_events {
            // Target tercapai; minta pipeline berhenti
            shared.stop.store(true, Ordering::Release);
            break;
        }

        let event = Event::synthetic(seq, LatencyTracker::now_ns());

        match shared.ring.try_push(event) {
            Ok(()) => {
                seq += 1;
                shared.produced.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                shared.push_fail_spins.fetch_add(1, Ordering::Relaxed);
                // Retry langsung tanpa backoff; hanya pause hint CPU
                std::hint::spin_loop();
            }
        }
    }
}

fn consumer_loop(shared: &Shared, tracker: &mut LatencyTracker) {
    let mut expected_seq = 0u64;

    // Lanjut sampai stop DAN buffer kosong: semua event yang sudah
    // masuk tetap dikonsumsi (drain penuh sebelum exit)
    while !shared.stop.load(Ordering::Acquire) || !shared.ring.empty() {
        match shared.ring.try_pop() {
            Some(event) => {
                let latency = LatencyTracker::now_ns().saturating_sub(event.enqueue_ns);
                tracker.record_ns(latency);
                shared.consumed.fetch_add(1, Ordering::Relaxed);

                // Integritas FIFO end-to-end: gap/reorder dihitung,
                // lalu resync - tidak pernah fatal
                if event.seq == expected_seq {
                    expected_seq += 1;
                } else {
                    shared.seq_mismatch.fetch_add(1, Ordering::Relaxed);
                    expected_seq = event.seq + 1;
                }
            }
            None => {
                shared.pop_fail_spins.fetch_add(1, Ordering::Relaxed);
                std::hint::spin_loop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_run_consumes_everything() {
        const TARGET: u64 = 50_000;

        let mut bus = EventBus::new(1024, 65_536);
        bus.start(TARGET);
        bus.join();

        let c = bus.counters();
        assert_eq!(c.produced, TARGET);
        assert_eq!(c.consumed, TARGET);
        assert_eq!(c.seq_mismatch, 0);

        let s = bus.latency_stats();
        assert_eq!(s.count, TARGET);
        assert!(s.min_ns <= s.p50_ns);
        assert!(s.p50_ns <= s.p99_ns);
        assert!(s.p99_ns <= s.p999_ns);
        assert!(s.p999_ns <= s.max_ns);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut bus = EventBus::new(64, 1024);
        bus.start(0);
        assert!(bus.running());

        // Start kedua saat running harus no-op, bukan thread baru
        bus.start(10);
        assert!(bus.running());

        bus.stop_and_join();
        assert!(!bus.running());

        let c = bus.counters();
        assert_eq!(c.produced, c.consumed);
    }

    #[test]
    fn test_join_when_idle_is_noop() {
        let mut bus = EventBus::new(64, 1024);
        bus.join();
        bus.stop_and_join();
        assert!(!bus.running());
        assert_eq!(bus.counters(), Counters::default());
    }

    #[test]
    fn test_restart_resets_state() {
        let mut bus = EventBus::new(256, 4096);

        bus.start(1_000);
        bus.join();
        assert_eq!(bus.counters().consumed, 1_000);

        bus.start(2_000);
        bus.join();

        let c = bus.counters();
        assert_eq!(c.produced, 2_000);
        assert_eq!(c.consumed, 2_000);
        assert_eq!(c.seq_mismatch, 0);
        assert_eq!(bus.latency_stats().count, 2_000);
    }

    #[test]
    fn test_latency_stats_zero_during_run() {
        let mut bus = EventBus::new(64, 1024);
        bus.start(0);
        // Tracker sedang dipegang consumer thread
        assert_eq!(bus.latency_stats(), Stats::default());
        bus.stop_and_join();
    }
}
