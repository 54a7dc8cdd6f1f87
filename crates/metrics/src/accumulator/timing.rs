//! Duration accumulator backed by logarithmic buckets
//!
//! Count, sum, min and max are kept exactly, in nanoseconds. Each sample also
//! lands in one of 50 buckets whose edges grow geometrically from 1µs to one
//! hour; percentiles are estimated from those buckets.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const NUM_BUCKETS: usize = 50;
const FIRST_EDGE_NANOS: u64 = 1_000; // 1µs
const LAST_EDGE_NANOS: u64 = 3_600_000_000_000; // 1 hour

/// Thread-safe accumulator of duration samples
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use faultline_metrics::accumulator::Timing;
///
/// let run_duration = Timing::new();
/// run_duration.add(Duration::from_millis(10));
/// run_duration.add(Duration::from_millis(30));
///
/// let snapshot = run_duration.snapshot();
/// assert_eq!(snapshot.count(), 2);
/// assert_eq!(snapshot.sum(), Duration::from_millis(40));
/// ```
pub struct Timing {
    buckets: [AtomicU64; NUM_BUCKETS],
    count: AtomicU64,
    sum_nanos: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl Timing {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            count: AtomicU64::new(0),
            sum_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
        }
    }

    /// Fold one duration sample into the accumulator
    ///
    /// The sum saturates at `u64::MAX` nanoseconds (about 584 years). Samples
    /// outside 1µs..1h are counted exactly but share the edge buckets.
    pub fn add(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.buckets[bucket_index(nanos)].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        let _ = self.sum_nanos.fetch_update(Ordering::Release, Ordering::Relaxed, |sum| {
            Some(sum.saturating_add(nanos))
        });
        self.min_nanos.fetch_min(nanos, Ordering::AcqRel);
        self.max_nanos.fetch_max(nanos, Ordering::AcqRel);
    }

    /// Number of samples added so far
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Sum of all samples added so far
    pub fn sum(&self) -> Duration {
        Duration::from_nanos(self.sum_nanos.load(Ordering::Acquire))
    }

    /// Copy the current statistics into an immutable snapshot
    pub fn snapshot(&self) -> TimingSnapshot {
        let buckets = self.buckets.iter().map(|bucket| bucket.load(Ordering::Acquire)).collect();

        let min_nanos = self.min_nanos.load(Ordering::Acquire);
        TimingSnapshot {
            buckets,
            count: self.count.load(Ordering::Acquire),
            sum_nanos: self.sum_nanos.load(Ordering::Acquire),
            min_nanos: if min_nanos == u64::MAX { 0 } else { min_nanos },
            max_nanos: self.max_nanos.load(Ordering::Acquire),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timing").field("count", &self.count()).field("sum", &self.sum()).finish()
    }
}

/// Upper edge of every bucket, in nanoseconds
///
/// Bucket `i` holds `[edge(i - 1), edge(i))`. The first bucket also takes
/// everything below 1µs and the last everything from one hour up.
fn upper_edges() -> &'static [u64; NUM_BUCKETS] {
    static EDGES: OnceLock<[u64; NUM_BUCKETS]> = OnceLock::new();
    EDGES.get_or_init(|| {
        let growth =
            (LAST_EDGE_NANOS as f64 / FIRST_EDGE_NANOS as f64).powf(1.0 / NUM_BUCKETS as f64);
        std::array::from_fn(|i| {
            if i == NUM_BUCKETS - 1 {
                LAST_EDGE_NANOS
            } else {
                (FIRST_EDGE_NANOS as f64 * growth.powi(i as i32 + 1)).round() as u64
            }
        })
    })
}

fn bucket_index(nanos: u64) -> usize {
    upper_edges().partition_point(|&upper| upper <= nanos).min(NUM_BUCKETS - 1)
}

/// Geometric centre of a bucket, used as its percentile estimate
fn bucket_estimate_nanos(bucket: usize) -> u64 {
    let edges = upper_edges();
    let lower = if bucket == 0 { FIRST_EDGE_NANOS } else { edges[bucket - 1] };
    (lower as f64 * edges[bucket] as f64).sqrt().round() as u64
}

/// Immutable copy of a [`Timing`] at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingSnapshot {
    buckets: Vec<u64>,
    count: u64,
    sum_nanos: u64,
    min_nanos: u64,
    max_nanos: u64,
}

impl TimingSnapshot {
    /// Number of samples
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Exact sum of all samples
    pub fn sum(&self) -> Duration {
        Duration::from_nanos(self.sum_nanos)
    }

    /// Mean sample, `None` when empty
    pub fn mean(&self) -> Option<Duration> {
        (self.count > 0).then(|| Duration::from_nanos(self.sum_nanos / self.count))
    }

    /// Smallest sample, `None` when empty
    pub fn min(&self) -> Option<Duration> {
        (self.count > 0).then(|| Duration::from_nanos(self.min_nanos))
    }

    /// Largest sample, `None` when empty
    pub fn max(&self) -> Option<Duration> {
        (self.count > 0).then(|| Duration::from_nanos(self.max_nanos))
    }

    /// Approximate percentile, `p` in `0.0..=1.0`
    ///
    /// Returns `None` when empty or when `p` is out of range. The estimate is
    /// the centre of the bucket holding the `p`-th sample, kept within the
    /// observed min and max.
    pub fn percentile(&self, p: f64) -> Option<Duration> {
        if self.count == 0 || !(0.0..=1.0).contains(&p) {
            return None;
        }

        let target = ((p * self.count as f64).ceil() as u64).max(1);
        let mut cumulative = 0u64;
        let bucket = self.buckets.iter().position(|&hits| {
            cumulative += hits;
            cumulative >= target
        });

        match bucket {
            Some(bucket) => {
                let estimate = bucket_estimate_nanos(bucket).max(self.min_nanos).min(self.max_nanos);
                Some(Duration::from_nanos(estimate))
            }
            None => self.max(),
        }
    }

    /// p50, p95, p99 and p999 in one call
    pub fn percentiles(&self) -> Percentiles {
        Percentiles {
            p50: self.percentile(0.50),
            p95: self.percentile(0.95),
            p99: self.percentile(0.99),
            p999: self.percentile(0.999),
        }
    }
}

impl fmt::Display for TimingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "count=0");
        }

        let show = |d: Option<Duration>| d.map_or_else(|| "N/A".to_string(), |d| format!("{d:.2?}"));
        write!(
            f,
            "count={}, sum={:.2?}, mean={}, min={}, max={}, p50={}, p99={}",
            self.count,
            self.sum(),
            show(self.mean()),
            show(self.min()),
            show(self.max()),
            show(self.percentile(0.5)),
            show(self.percentile(0.99)),
        )
    }
}

/// Common percentile values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Percentiles {
    pub p50: Option<Duration>,
    pub p95: Option<Duration>,
    pub p99: Option<Duration>,
    pub p999: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_timing_sum_and_count_are_exact() {
        let timing = Timing::new();
        for ms in [10, 10, 10, 5] {
            timing.add(Duration::from_millis(ms));
        }

        assert_eq!(timing.count(), 4);
        assert_eq!(timing.sum(), Duration::from_millis(35));

        let snapshot = timing.snapshot();
        assert_eq!(snapshot.count(), 4);
        assert_eq!(snapshot.sum(), Duration::from_millis(35));
    }

    #[test]
    fn test_timing_min_max_mean() {
        let timing = Timing::new();
        timing.add(Duration::from_millis(5));
        timing.add(Duration::from_millis(50));
        timing.add(Duration::from_millis(25));

        let snapshot = timing.snapshot();
        assert_eq!(snapshot.min(), Some(Duration::from_millis(5)));
        assert_eq!(snapshot.max(), Some(Duration::from_millis(50)));
        assert_eq!(snapshot.mean(), Some(Duration::from_nanos(26_666_666)));
    }

    #[test]
    fn test_empty_timing() {
        let snapshot = Timing::new().snapshot();

        assert_eq!(snapshot.count(), 0);
        assert_eq!(snapshot.sum(), Duration::ZERO);
        assert_eq!(snapshot.mean(), None);
        assert_eq!(snapshot.min(), None);
        assert_eq!(snapshot.max(), None);
        assert_eq!(snapshot.percentile(0.5), None);
        assert_eq!(snapshot.to_string(), "count=0");
    }

    #[test]
    fn test_zero_duration_is_counted() {
        let timing = Timing::new();
        timing.add(Duration::ZERO);

        let snapshot = timing.snapshot();
        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.sum(), Duration::ZERO);
        assert_eq!(snapshot.min(), Some(Duration::ZERO));
        assert_eq!(snapshot.max(), Some(Duration::ZERO));
        assert_eq!(snapshot.percentile(0.5), Some(Duration::ZERO));
    }

    #[test]
    fn test_sub_microsecond_samples_are_summed() {
        let timing = Timing::new();
        for _ in 0..1000 {
            timing.add(Duration::from_nanos(900));
        }

        let snapshot = timing.snapshot();
        assert_eq!(snapshot.sum(), Duration::from_micros(900));
        assert_eq!(snapshot.min(), Some(Duration::from_nanos(900)));
        assert_eq!(snapshot.max(), Some(Duration::from_nanos(900)));
        assert_eq!(snapshot.mean(), Some(Duration::from_nanos(900)));
    }

    #[test]
    fn test_percentiles_track_distribution() {
        let timing = Timing::new();
        for ms in 1..=100 {
            timing.add(Duration::from_millis(ms));
        }

        let snapshot = timing.snapshot();
        let p50 = snapshot.percentile(0.5).unwrap();
        assert!(p50 >= Duration::from_millis(40) && p50 <= Duration::from_millis(70));
        assert!(snapshot.percentile(0.99).unwrap() >= Duration::from_millis(90));
        assert_eq!(snapshot.percentile(1.5), None);
        assert_eq!(snapshot.percentile(-0.1), None);

        let all = snapshot.percentiles();
        assert!(all.p50.is_some() && all.p95.is_some() && all.p99.is_some() && all.p999.is_some());
    }

    #[test]
    fn test_samples_beyond_an_hour_keep_exact_sum() {
        let timing = Timing::new();
        timing.add(Duration::from_secs(7200));
        timing.add(Duration::from_secs(7200));

        let snapshot = timing.snapshot();
        assert_eq!(snapshot.sum(), Duration::from_secs(14_400));
        assert_eq!(snapshot.max(), Some(Duration::from_secs(7200)));
        assert_eq!(snapshot.percentile(0.99), Some(Duration::from_secs(7200)));
    }

    #[test]
    fn test_single_sample_percentile_is_exact() {
        let timing = Timing::new();
        timing.add(Duration::from_millis(42));

        let snapshot = timing.snapshot();
        assert_eq!(snapshot.percentile(0.0), Some(Duration::from_millis(42)));
        assert_eq!(snapshot.percentile(1.0), Some(Duration::from_millis(42)));
    }

    #[test]
    fn test_bucket_edges_are_increasing() {
        let edges = upper_edges();
        assert!(edges.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(edges[NUM_BUCKETS - 1], LAST_EDGE_NANOS);
        assert_eq!(bucket_index(0), 0);
        assert_eq!(bucket_index(u64::MAX), NUM_BUCKETS - 1);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_samples() {
        let timing = Timing::new();
        timing.add(Duration::from_millis(1));
        let before = timing.snapshot();

        timing.add(Duration::from_millis(2));

        assert_eq!(before.count(), 1);
        assert_eq!(timing.count(), 2);
    }

    #[test]
    fn test_display_summary() {
        let timing = Timing::new();
        timing.add(Duration::from_millis(10));
        timing.add(Duration::from_millis(20));

        let summary = timing.snapshot().to_string();
        assert!(summary.contains("count=2"));
        assert!(summary.contains("p50="));
    }

    #[test]
    fn test_concurrent_adds() {
        let timing = Arc::new(Timing::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let timing = Arc::clone(&timing);
                thread::spawn(move || {
                    for _ in 0..100 {
                        timing.add(Duration::from_micros(10));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(timing.count(), 1000);
        assert_eq!(timing.sum(), Duration::from_millis(10));
    }
}
