//! Event - payload pipeline dengan ukuran tetap
//!
//! Record trivially-copyable yang muat dalam satu cache line.
//! Tidak ada alokasi dinamis, tidak ada pointer.

use std::mem;

/// Sisi order
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

/// Jenis event market
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Trade = 0,
    Quote = 1,
    Cancel = 2,
}

/// Market event yang mengalir lewat ring buffer
///
/// `enqueue_ns` diisi producer tepat sebelum push; consumer menghitung
/// latency end-to-end dari selisihnya dengan waktu pop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Sequence number, naik monoton per event
    pub seq: u64,
    /// Timestamp enqueue (nanoseconds, monoton)
    pub enqueue_ns: u64,
    /// Harga dalam ticks (fixed-point)
    pub price_ticks: i64,
    /// Ukuran order
    pub qty: u32,
    /// Identifier instrumen
    pub instrument_id: u32,
    pub side: Side,
    pub kind: EventKind,
}

// Event harus muat dalam satu cache line (64 bytes)
const _: () = assert!(mem::size_of::<Event>() <= 64);

impl Event {
    /// Payload sintetis deterministik dari sequence number.
    ///
    /// Bisa diganti generator market event sungguhan nanti; untuk
    /// benchmark yang penting field-nya murah dihitung dan bervariasi.
    #[inline(always)]
    pub fn synthetic(seq: u64, enqueue_ns: u64) -> Self {
        Self {
            seq,
            enqueue_ns,
            price_ticks: 100_000 + (seq % 1_000) as i64,
            qty: 100 + (seq & 0x3F) as u32,
            instrument_id: (seq & 0xFFFF) as u32,
            side: if seq & 1 == 1 { Side::Buy } else { Side::Sell },
            kind: EventKind::Trade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_fits_cache_line() {
        assert!(mem::size_of::<Event>() <= 64);
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let a = Event::synthetic(7, 1000);
        let b = Event::synthetic(7, 1000);
        assert_eq!(a, b);

        assert_eq!(a.seq, 7);
        assert_eq!(a.enqueue_ns, 1000);
        assert_eq!(a.price_ticks, 100_007);
        assert_eq!(a.qty, 107);
        assert_eq!(a.instrument_id, 7);
        assert_eq!(a.side, Side::Buy);
        assert_eq!(a.kind, EventKind::Trade);

        let c = Event::synthetic(0x2_0010, 0);
        assert_eq!(c.instrument_id, 0x10);
        assert_eq!(c.side, Side::Sell);
    }
}
