//! Merkurius Benchmark Driver
//!
//! Menjalankan pipeline SPSC end-to-end: warmup run (tidak diukur),
//! lalu measured run, lalu laporan throughput + tail latency.
//!
//! Usage:
//!   cargo run --release -- [--events N] [--ring N] [--samples N] [--warmup N]

use std::time::Instant;

use merkurius::EventBus;

/// Tunables benchmark (start conservative; naikkan untuk benchmark nyata)
struct Config {
    /// Target event untuk measured run
    events: u64,
    /// Kapasitas ring yang diminta (dibulatkan ke power of 2)
    ring_capacity: usize,
    /// Jumlah maksimum latency sample yang disimpan
    max_samples: usize,
    /// Event warmup (tidak diukur)
    warmup_events: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            events: 5_000_000,
            ring_capacity: 1 << 16,
            max_samples: 1 << 20,
            warmup_events: 300_000,
        }
    }
}

impl Config {
    fn from_args() -> Self {
        let mut config = Self::default();
        let mut args = std::env::args().skip(1);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--events" => {
                    if let Some(v) = args.next().and_then(|s| s.parse().ok()) {
                        config.events = v;
                    }
                }
                "--ring" => {
                    if let Some(v) = args.next().and_then(|s| s.parse().ok()) {
                        config.ring_capacity = v;
                    }
                }
                "--samples" => {
                    if let Some(v) = args.next().and_then(|s| s.parse().ok()) {
                        config.max_samples = v;
                    }
                }
                "--warmup" => {
                    if let Some(v) = args.next().and_then(|s| s.parse().ok()) {
                        config.warmup_events = v;
                    }
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown option: {}", other);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }

        if config.events == 0 {
            eprintln!("--events must be > 0 (bounded run required for a report)");
            std::process::exit(1);
        }

        config
    }
}

fn print_usage() {
    println!("Usage: merkurius [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --events N    Target events for the measured run (default 5000000)");
    println!("  --ring N      Requested ring capacity, rounded up to power of 2 (default 65536)");
    println!("  --samples N   Max latency samples kept (default 1048576)");
    println!("  --warmup N    Warmup events, not measured (default 300000)");
}

fn ns_to_us(ns: u64) -> f64 {
    ns as f64 / 1000.0
}

fn main() {
    let config = Config::from_args();

    println!("🚀 Merkurius - SPSC Event Pipeline Benchmark");
    println!("=============================================\n");

    let mut bus = EventBus::new(config.ring_capacity, config.max_samples);

    // Warmup run (stats diabaikan)
    if config.warmup_events > 0 {
        println!("🔥 Warmup: {} events...", config.warmup_events);
        bus.start(config.warmup_events);
        bus.join();
    }

    // Measured run
    println!("📈 Measured run: {} events...\n", config.events);
    let t0 = Instant::now();
    bus.start(config.events);
    bus.join();
    let elapsed = t0.elapsed();

    let stats = bus.latency_stats();
    let counters = bus.counters();

    let secs = elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        counters.consumed as f64 / secs
    } else {
        0.0
    };

    println!("📊 RESULTS");
    println!("----------");
    println!("  Ring capacity:   {}", config.ring_capacity);
    println!("  Target events:   {}", config.events);
    println!("  Consumed:        {}", counters.consumed);
    println!("  Elapsed:         {:.6}s", secs);
    println!("  Throughput:      {:.0} events/sec", throughput);

    println!("\nLatency ({} samples kept):", stats.count);
    println!(
        "  min:   {:>9} ns ({:.3} μs)",
        stats.min_ns,
        ns_to_us(stats.min_ns)
    );
    println!(
        "  p50:   {:>9} ns ({:.3} μs)",
        stats.p50_ns,
        ns_to_us(stats.p50_ns)
    );
    println!(
        "  p99:   {:>9} ns ({:.3} μs)",
        stats.p99_ns,
        ns_to_us(stats.p99_ns)
    );
    println!(
        "  p99.9: {:>9} ns ({:.3} μs)",
        stats.p999_ns,
        ns_to_us(stats.p999_ns)
    );
    println!(
        "  max:   {:>9} ns ({:.3} μs)",
        stats.max_ns,
        ns_to_us(stats.max_ns)
    );
    println!(
        "  mean:  {:>11.1} ns ({:.3} μs)",
        stats.mean_ns,
        stats.mean_ns / 1000.0
    );

    println!("\nCounters:");
    println!("  produced:         {}", counters.produced);
    println!("  push fail spins:  {}", counters.push_fail_spins);
    println!("  pop fail spins:   {}", counters.pop_fail_spins);
    println!("  seq mismatches:   {}", counters.seq_mismatch);

    if counters.consumed == config.events && counters.seq_mismatch == 0 {
        println!("\n✅ Pipeline intact - all events consumed in FIFO order");
    } else {
        println!("\n⚠️  Pipeline anomaly detected - check counters above");
    }
}
