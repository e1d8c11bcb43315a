//! Fixed-Capacity Latency Tracker
//!
//! Sampling dengan ring semantics: setelah penuh, sample tertua digusur
//! oleh yang baru. Storage dialokasikan sekali saat konstruksi; hot path
//! (`record_ns`) bebas alokasi dengan running sum O(1). Percentile
//! dihitung offline via sort (`compute`), di luar jalur pengukuran.

use std::sync::OnceLock;
use std::time::Instant;

/// Ringkasan statistik latency dalam nanoseconds
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Stats {
    pub count: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    pub p50_ns: u64,
    pub p99_ns: u64,
    pub p999_ns: u64,
}

/// Latency sample store dengan kapasitas tetap
///
/// Tidak di-synchronize secara internal: caller menjamin satu thread
/// penulis selama run aktif, dan `compute()` hanya dipanggil setelah
/// recording berhenti (post-join).
pub struct LatencyTracker {
    // Sample disimpan sebagai u32 ns (di-clamp); 4 byte per sample
    // supaya 1M+ sample tetap ringan di cache saat sort
    samples: Box<[u32]>,
    write_idx: usize,
    count: usize,
    sum_ns: u64,
}

impl LatencyTracker {
    /// Alokasi storage sekali di sini. Tidak ada alokasi di `record_ns`.
    ///
    /// # Panics
    /// Panic jika `max_samples == 0` (programmer error, fail fast).
    pub fn new(max_samples: usize) -> Self {
        assert!(max_samples > 0, "max_samples must be > 0");
        Self {
            samples: vec![0u32; max_samples].into_boxed_slice(),
            write_idx: 0,
            count: 0,
            sum_ns: 0,
        }
    }

    /// Hot path: dipanggil sekali per event yang di-dequeue.
    ///
    /// Value di atas `u32::MAX` ns di-clamp (defensive terhadap anomali
    /// clock; tidak pernah terjadi dalam praktik).
    #[inline(always)]
    pub fn record_ns(&mut self, latency_ns: u64) {
        let v = latency_ns.min(u32::MAX as u64) as u32;

        if self.count < self.samples.len() {
            self.count += 1;
        } else {
            // Penuh: gusur sample tertua dari running sum
            self.sum_ns -= u64::from(self.samples[self.write_idx]);
        }

        self.samples[self.write_idx] = v;
        self.sum_ns += u64::from(v);
        self.write_idx = (self.write_idx + 1) % self.samples.len();
    }

    /// Offline: copy + sort sample valid, lalu hitung ringkasan.
    /// Returns `Stats` zero jika belum ada sample.
    pub fn compute(&self) -> Stats {
        let mut stats = Stats {
            count: self.count as u64,
            ..Stats::default()
        };

        if self.count == 0 {
            return stats;
        }

        let mut data: Vec<u32> = self.samples[..self.count].to_vec();
        data.sort_unstable();

        stats.min_ns = u64::from(data[0]);
        stats.max_ns = u64::from(data[data.len() - 1]);
        stats.mean_ns = self.sum_ns as f64 / self.count as f64;

        let n = data.len();
        stats.p50_ns = u64::from(data[Self::percentile_index(0.50, n)]);
        stats.p99_ns = u64::from(data[Self::percentile_index(0.99, n)]);
        stats.p999_ns = u64::from(data[Self::percentile_index(0.999, n)]);

        stats
    }

    /// Reset state logis tanpa release/realokasi storage
    pub fn reset(&mut self) {
        self.write_idx = 0;
        self.count = 0;
        self.sum_ns = 0;
    }

    /// Kapasitas sample store
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Jumlah sample valid saat ini (<= capacity)
    pub fn count(&self) -> usize {
        self.count
    }

    /// Timestamp monoton dalam nanoseconds.
    ///
    /// Epoch-nya adalah pemanggilan pertama dalam process; hanya selisih
    /// antar pemanggilan yang bermakna.
    #[inline(always)]
    pub fn now_ns() -> u64 {
        static EPOCH: OnceLock<Instant> = OnceLock::new();
        EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
    }

    // Nearest-rank dengan bias nilai atas: idx = ceil(p*n) - 1,
    // di-clamp ke [0, n-1]
    fn percentile_index(p: f64, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let idx = (p * n as f64).ceil() as usize;
        idx.saturating_sub(1).min(n - 1)
    }
}
