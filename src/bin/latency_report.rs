use flash_twap::{Engine, Event, Op};
use hdrhistogram::Histogram;
use std::time::Instant;

/// Orders kept live before the oldest is erased
const BOOK_DEPTH: i64 = 1_000;

fn main() -> anyhow::Result<()> {
    println!("Preparing Latency Benchmark...");

    let mut engine = Engine::with_capacity(BOOK_DEPTH as usize * 2);
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 100_000, 3)?;

    const ITERATIONS: i64 = 1_000_000;

    println!("Running {} iterations...", ITERATIONS);

    let mut total_duration = std::time::Duration::new(0, 0);

    for i in 0..ITERATIONS {
        // Alternate inserts and erases over a sliding window of BOOK_DEPTH
        // orders. Erases before the window fills hit unknown ids.
        let order_id = i / 2;
        let op = if i % 2 == 0 {
            Op::insert(order_id, 100.0 + (order_id % 100) as f64 * 0.01)
        } else {
            Op::erase(order_id - BOOK_DEPTH)
        };
        let event = Event::new(i, op);

        // Critical measurement section
        let start = Instant::now();
        std::hint::black_box(engine.process_event(event));
        let elapsed = start.elapsed();

        histogram.saturating_record(elapsed.as_nanos() as u64);
        total_duration += elapsed;
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total Ops:  {}", ITERATIONS);
    println!("Throughput: {:.2} ops/sec", ITERATIONS as f64 / total_duration.as_secs_f64());
    println!("Live Orders: {}", engine.order_count());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");

    println!("\nDistribution:");
    for v in histogram.iter_log(100, 2.0) {
        let count = v.count_since_last_iteration();
        if count > 0 {
            println!("<= {:6} ns: {:10} count", v.value_iterated_to(), count);
        }
    }

    Ok(())
}
