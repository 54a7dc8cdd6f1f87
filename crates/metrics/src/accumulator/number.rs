//! Lock-free running total and running maximum

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe numeric accumulator
///
/// Tracks a running sum and the largest value seen through
/// [`update_max`](Self::update_max). Both values are `f64`s stored as bit
/// patterns in `AtomicU64`s, so every operation is a compare-exchange loop
/// and never blocks.
///
/// Input is not validated. Negative deltas and NaN are folded in as given.
///
/// # Examples
///
/// ```rust
/// use faultline_metrics::accumulator::Number;
///
/// let requests = Number::new();
/// requests.increment(1.0);
/// requests.increment(2.0);
/// requests.update_max(7.0);
///
/// assert_eq!(requests.sum(), 3.0);
/// assert_eq!(requests.max(), 7.0);
/// ```
pub struct Number {
    sum_bits: AtomicU64,
    max_bits: AtomicU64,
}

impl Number {
    /// Create a zeroed accumulator
    pub fn new() -> Self {
        Self { sum_bits: AtomicU64::new(0f64.to_bits()), max_bits: AtomicU64::new(0f64.to_bits()) }
    }

    /// Atomically add `delta` to the running total
    pub fn increment(&self, delta: f64) {
        Self::fetch_update_f64(&self.sum_bits, |current| current + delta);
    }

    /// Atomically raise the stored maximum to `value` if it is larger
    pub fn update_max(&self, value: f64) {
        let mut current = self.max_bits.load(Ordering::Acquire);
        while value > f64::from_bits(current) {
            match self.max_bits.compare_exchange_weak(
                current,
                value.to_bits(),
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    /// Current running total
    pub fn sum(&self) -> f64 {
        f64::from_bits(self.sum_bits.load(Ordering::Acquire))
    }

    /// Largest value observed through `update_max`
    pub fn max(&self) -> f64 {
        f64::from_bits(self.max_bits.load(Ordering::Acquire))
    }

    fn fetch_update_f64(target: &AtomicU64, f: impl Fn(f64) -> f64) {
        let mut current = target.load(Ordering::Relaxed);
        loop {
            let next = f(f64::from_bits(current)).to_bits();
            match target.compare_exchange_weak(current, next, Ordering::Release, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Number").field("sum", &self.sum()).field("max", &self.max()).finish()
    }
}
