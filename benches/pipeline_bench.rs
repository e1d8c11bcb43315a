//! Criterion benchmark untuk Ring Buffer + Latency Tracker
//!
//! Run dengan: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use merkurius::{Event, LatencyTracker, RingBuffer};

fn bench_ring_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");
    group.throughput(Throughput::Elements(1));

    // Benchmark push (payload Event, satu cache line)
    group.bench_function("push_event", |b| {
        let rb: RingBuffer<Event> = RingBuffer::new(65536);
        let mut i = 0u64;
        b.iter(|| {
            let e = Event::synthetic(i, black_box(i));
            if rb.try_push(black_box(e)).is_err() {
                rb.try_pop();
                rb.try_push(e).ok();
            }
            i = i.wrapping_add(1);
        });
    });

    // Benchmark pop
    group.bench_function("pop_event", |b| {
        let rb: RingBuffer<Event> = RingBuffer::new(65536);
        // Pre-fill setengah kapasitas
        for i in 0..32768 {
            rb.try_push(Event::synthetic(i, 0)).ok();
        }
        b.iter(|| {
            if let Some(e) = rb.try_pop() {
                rb.try_push(black_box(e)).ok();
            }
        });
    });

    // Benchmark push+pop cycle
    group.bench_function("push_pop_cycle", |b| {
        let rb: RingBuffer<Event> = RingBuffer::new(65536);
        let mut i = 0u64;
        b.iter(|| {
            rb.try_push(black_box(Event::synthetic(i, i))).ok();
            black_box(rb.try_pop());
            i = i.wrapping_add(1);
        });
    });

    group.finish();
}

fn bench_latency_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("latency_tracker");
    group.throughput(Throughput::Elements(1));

    // Hot path: record dengan ring overwrite aktif
    group.bench_function("record_ns", |b| {
        let mut lt = LatencyTracker::new(1 << 20);
        let mut i = 0u64;
        b.iter(|| {
            lt.record_ns(black_box(i % 10_000));
            i = i.wrapping_add(1);
        });
    });

    group.bench_function("now_ns", |b| {
        b.iter(|| black_box(LatencyTracker::now_ns()));
    });

    group.finish();
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");

    // Cold path: sort + percentile pada store penuh
    for sample_count in [1_000usize, 100_000, 1_000_000] {
        group.throughput(Throughput::Elements(sample_count as u64));
        group.bench_function(format!("samples_{}", sample_count), |b| {
            let mut lt = LatencyTracker::new(sample_count);
            for i in 0..sample_count as u64 {
                lt.record_ns(i.wrapping_mul(2654435761) % 1_000_000);
            }
            b.iter(|| black_box(lt.compute()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ring_buffer, bench_latency_tracker, bench_compute);
criterion_main!(benches);
