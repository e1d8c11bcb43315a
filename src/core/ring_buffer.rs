//! Lock-Free Single-Producer Single-Consumer (SPSC) Ring Buffer
//!
//! Implementasi menggunakan Lamport Queue dengan memory ordering yang tepat.
//! Tidak ada Mutex, tidak ada alokasi setelah inisialisasi. Kapasitas
//! dibulatkan ke power of 2 terdekat (minimum 2) saat konstruksi.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};

/// Slot dalam ring buffer - storage mentah untuk satu payload
struct Slot<T> {
    data: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    const fn new() -> Self {
        Self {
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Padding untuk cache line isolation (64 bytes pada x86-64)
#[repr(C, align(64))]
struct CacheLinePadded<T> {
    value: T,
}

impl<T> CacheLinePadded<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

/// Lock-Free SPSC Ring Buffer
///
/// Head dan tail berada di cache line terpisah untuk menghindari
/// false sharing antara producer dan consumer. Kedua index adalah
/// counter u64 yang naik monoton dan tidak pernah di-wrap; posisi slot
/// dihitung via `index & mask`.
///
/// Slot di posisi `i` berisi nilai hidup iff `tail <= i < head`.
/// Invariant: `0 <= head - tail <= capacity`.
///
/// Precondition SPSC (tidak dicek saat runtime): tepat satu thread
/// memanggil `try_push`, tepat satu thread memanggil `try_pop`.
/// Melanggar ini adalah undefined behavior.
pub struct RingBuffer<T> {
    // Producer side - cache line aligned
    head: CacheLinePadded<AtomicU64>,
    // Consumer side - cache line aligned
    tail: CacheLinePadded<AtomicU64>,
    // Pre-allocated buffer di heap - tidak ada alokasi setelah init
    buffer: Box<[Slot<T>]>,
    // Mask untuk operasi modulo yang cepat (capacity power of 2)
    mask: u64,
    capacity: u64,
}

// SAFETY: RingBuffer aman untuk Send/Sync karena:
// - Hanya satu producer (menulis head)
// - Hanya satu consumer (menulis tail)
// - Atomic operations menjamin visibility
unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T> RingBuffer<T> {
    /// Membuat ring buffer baru dengan kapasitas yang diminta.
    ///
    /// Kapasitas dibulatkan ke power of 2 berikutnya, minimum 2.
    /// Alokasi hanya terjadi sekali di sini; hot path bebas alokasi.
    pub fn new(requested_capacity: usize) -> Self {
        let capacity = requested_capacity.max(2).next_power_of_two();

        // Alokasi buffer di heap untuk menghindari stack overflow
        let mut buffer = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            buffer.push(Slot::new());
        }

        Self {
            head: CacheLinePadded::new(AtomicU64::new(0)),
            tail: CacheLinePadded::new(AtomicU64::new(0)),
            buffer: buffer.into_boxed_slice(),
            mask: (capacity - 1) as u64,
            capacity: capacity as u64,
        }
    }

    /// Push value ke buffer (Producer side)
    ///
    /// Returns `Ok(())` jika berhasil. Jika buffer penuh, value
    /// dikembalikan via `Err` tanpa mutasi apa pun - tidak ada copy,
    /// cocok untuk payload move-only. Zero-allocation, lock-free,
    /// tidak pernah blocking.
    #[inline(always)]
    pub fn try_push(&self, value: T) -> Result<(), T> {
        let head = self.head.value.load(Ordering::Relaxed);
        // Acquire: lihat slot yang baru saja dibebaskan consumer
        // sebelum memutuskan buffer penuh
        let tail = self.tail.value.load(Ordering::Acquire);

        if head.wrapping_sub(tail) == self.capacity {
            return Err(value);
        }

        let slot = &self.buffer[(head & self.mask) as usize];

        // SAFETY: slot di posisi head bebas (di luar [tail, head));
        // hanya thread ini yang menulis head
        unsafe {
            (*slot.data.get()).write(value);
        }

        // Release: pastikan konstruksi slot visible sebelum head di-update
        self.head
            .value
            .store(head.wrapping_add(1), Ordering::Release);

        Ok(())
    }

    /// Pop value dari buffer (Consumer side)
    ///
    /// Returns `Some(T)` jika ada data (ownership pindah ke caller),
    /// `None` jika buffer kosong. Zero-allocation, lock-free.
    #[inline(always)]
    pub fn try_pop(&self) -> Option<T> {
        let tail = self.tail.value.load(Ordering::Relaxed);
        // Acquire: lihat konstruksi slot yang baru di-publish producer
        let head = self.head.value.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let slot = &self.buffer[(tail & self.mask) as usize];

        // SAFETY: slot ini sudah ditulis producer dan tidak sedang
        // ditulis ulang; read ini memindahkan ownership keluar sehingga
        // slot kembali uninitialized
        let value = unsafe { (*slot.data.get()).assume_init_read() };

        // Release: pastikan read di atas selesai sebelum tail di-update
        self.tail
            .value
            .store(tail.wrapping_add(1), Ordering::Release);

        Some(value)
    }

    /// Cek apakah buffer kosong. Advisory snapshot - hasilnya bisa
    /// langsung stale di bawah penggunaan konkuren; untuk diagnostik.
    #[inline(always)]
    pub fn empty(&self) -> bool {
        let tail = self.tail.value.load(Ordering::Acquire);
        let head = self.head.value.load(Ordering::Acquire);
        tail == head
    }

    /// Cek apakah buffer penuh. Advisory snapshot, untuk diagnostik.
    #[inline(always)]
    pub fn full(&self) -> bool {
        let head = self.head.value.load(Ordering::Acquire);
        let tail = self.tail.value.load(Ordering::Acquire);
        head.wrapping_sub(tail) == self.capacity
    }

    /// Jumlah elemen dalam buffer (advisory snapshot)
    #[inline(always)]
    pub fn len(&self) -> usize {
        let head = self.head.value.load(Ordering::Acquire);
        let tail = self.tail.value.load(Ordering::Acquire);
        head.wrapping_sub(tail) as usize
    }

    /// Kapasitas buffer setelah pembulatan power of 2
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }
}

impl<T> Drop for RingBuffer<T> {
    fn drop(&mut self) {
        // Drain: destroy semua slot hidup di antara tail dan head
        // supaya payload non-trivial tidak bocor
        let mut tail = *self.tail.value.get_mut();
        let head = *self.head.value.get_mut();

        while tail != head {
            let slot = &self.buffer[(tail & self.mask) as usize];
            // SAFETY: slot di [tail, head) dijamin berisi nilai hidup
            unsafe {
                (*slot.data.get()).assume_init_drop();
            }
            tail = tail.wrapping_add(1);
        }
    }
}
