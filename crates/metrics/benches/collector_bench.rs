//! Collector hot-path benchmarks
//!
//! Covers the work done on every protected call: accumulator updates, the
//! default collector fan-out, and pool usage sends.
//!
//! Run with: `cargo bench --bench collector_bench -p faultline-metrics`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use faultline_metrics::{
    CollectorRegistry, CollectorSet, DefaultMetricCollector, MetricCollector, MetricOutcome,
    Number, PoolTrackerConfig, PoolUsageTracker, Timing,
};
use tokio::runtime::Builder as RuntimeBuilder;

// ============================================================================
// Accumulator Benchmarks
// ============================================================================

fn bench_accumulators(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulators");

    group.bench_function("number_increment", |b| {
        let number = Number::new();
        b.iter(|| number.increment(black_box(1.0)));
    });

    group.bench_function("number_update_max", |b| {
        let number = Number::new();
        let mut value = 0.0;
        b.iter(|| {
            value += 1.0;
            number.update_max(black_box(value));
        });
    });

    group.bench_function("timing_add", |b| {
        let timing = Timing::new();
        b.iter(|| timing.add(black_box(Duration::from_micros(750))));
    });

    group.bench_function("timing_percentiles", |b| {
        let timing = Timing::new();
        for micros in 1..10_000 {
            timing.add(Duration::from_micros(micros));
        }
        b.iter(|| black_box(timing.snapshot().percentiles()));
    });

    group.finish();
}

// ============================================================================
// Collector Benchmarks
// ============================================================================

fn bench_default_collector(c: &mut Criterion) {
    let mut group = c.benchmark_group("default_collector");
    let success = MetricOutcome::success(Duration::from_millis(3));
    let failure = MetricOutcome::failure(Duration::from_millis(7));

    group.bench_function("update_success", |b| {
        let collector = DefaultMetricCollector::new("bench");
        b.iter(|| collector.update(black_box(&success)));
    });

    group.bench_function("update_then_snapshot", |b| {
        let collector = DefaultMetricCollector::new("bench");
        b.iter(|| {
            collector.update(&success);
            collector.update(&failure);
            black_box(collector.snapshot());
        });
    });

    for threads in [2usize, 4, 8] {
        let id = BenchmarkId::new("contended_update", threads);
        group.bench_with_input(id, &threads, |b, &threads| {
            let collector = Arc::new(DefaultMetricCollector::new("bench"));
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let collector = Arc::clone(&collector);
                        thread::spawn(move || {
                            for _ in 0..100 {
                                collector.update(&success);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    if handle.join().is_err() {
                        panic!("benchmark writer panicked");
                    }
                }
            });
        });
    }

    group.finish();
}

fn bench_collector_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("collector_set");
    let outcome = MetricOutcome::success(Duration::from_millis(3));

    for backends in [1usize, 4] {
        let registry = CollectorRegistry::new();
        for _ in 0..backends {
            registry.register_default();
        }
        let set = CollectorSet::initialize(&registry, "bench");

        group.bench_with_input(BenchmarkId::new("update", backends), &set, |b, set| {
            b.iter(|| set.update(black_box(&outcome)));
        });
    }

    group.finish();
}

// ============================================================================
// Pool Tracker Benchmarks
// ============================================================================

fn bench_pool_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_tracker");
    let runtime = match RuntimeBuilder::new_multi_thread().worker_threads(2).enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => panic!("failed to build benchmark runtime: {err}"),
    };

    for capacity in [1usize, 64] {
        group.bench_with_input(BenchmarkId::new("send", capacity), &capacity, |b, &capacity| {
            let config = PoolTrackerConfig::default().with_channel_capacity(capacity);
            let tracker = match PoolUsageTracker::on_runtime("bench", config, runtime.handle()) {
                Ok(tracker) => tracker,
                Err(err) => panic!("invalid benchmark tracker config: {err}"),
            };
            let sender = tracker.sender();

            b.to_async(&runtime).iter(|| {
                let sender = sender.clone();
                async move {
                    if let Err(err) = sender.send(black_box(4)).await {
                        panic!("pool usage send failed: {err}");
                    }
                }
            });

            tracker.close();
        });
    }

    group.finish();
}

criterion_group!(
    collectors,
    bench_accumulators,
    bench_default_collector,
    bench_collector_set,
    bench_pool_tracker
);
criterion_main!(collectors);
