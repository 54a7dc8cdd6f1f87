//! In-process collector keeping one accumulator per outcome field
//!
//! `update` takes the read lock, so any number of updates run side by side.
//! `reset` takes the write lock and swaps the whole accumulator set for a
//! fresh one. An update therefore lands entirely before or entirely after a
//! reset, never split across the two sets.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::outcome::MetricOutcome;
use super::traits::{CollectorFactory, MetricCollector};
use crate::accumulator::{Number, Timing, TimingSnapshot};

/// One complete generation of accumulators
///
/// Replaced wholesale on reset; never zeroed in place.
#[derive(Debug, Default)]
struct Accumulators {
    num_requests: Arc<Number>,
    errors: Arc<Number>,
    successes: Arc<Number>,
    failures: Arc<Number>,
    rejects: Arc<Number>,
    short_circuits: Arc<Number>,
    timeouts: Arc<Number>,
    fallback_successes: Arc<Number>,
    fallback_failures: Arc<Number>,
    context_canceled: Arc<Number>,
    context_deadline_exceeded: Arc<Number>,
    concurrency_in_use: Arc<Number>,
    total_duration: Arc<Timing>,
    run_duration: Arc<Timing>,
}

impl Accumulators {
    fn apply(&self, outcome: &MetricOutcome) {
        self.num_requests.increment(outcome.attempts);
        self.errors.increment(outcome.errors);
        self.successes.increment(outcome.successes);
        self.failures.increment(outcome.failures);
        self.rejects.increment(outcome.rejects);
        self.short_circuits.increment(outcome.short_circuits);
        self.timeouts.increment(outcome.timeouts);
        self.fallback_successes.increment(outcome.fallback_successes);
        self.fallback_failures.increment(outcome.fallback_failures);
        self.context_canceled.increment(outcome.context_canceled);
        self.context_deadline_exceeded.increment(outcome.context_deadline_exceeded);
        self.concurrency_in_use.update_max(outcome.concurrency_in_use);

        // A zero duration means "not measured", so it must not count as a sample.
        if !outcome.total_duration.is_zero() {
            self.total_duration.add(outcome.total_duration);
        }
        if !outcome.run_duration.is_zero() {
            self.run_duration.add(outcome.run_duration);
        }
    }
}

/// Default in-process [`MetricCollector`]
///
/// Accessors return the accumulator currently in use. A handle obtained before
/// a [`reset`](MetricCollector::reset) keeps its value frozen at the moment of
/// the reset, which lets exporters read a finished window after swapping.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use faultline_metrics::{DefaultMetricCollector, MetricCollector, MetricOutcome};
///
/// let collector = DefaultMetricCollector::new("payments");
/// collector.update(&MetricOutcome::success(Duration::from_millis(8)));
///
/// let window = collector.successes();
/// collector.reset();
///
/// assert_eq!(window.sum(), 1.0);
/// assert_eq!(collector.successes().sum(), 0.0);
/// ```
pub struct DefaultMetricCollector {
    name: String,
    metrics: RwLock<Accumulators>,
}

macro_rules! accumulator_accessors {
    ($($(#[$doc:meta])* $field:ident -> $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $field(&self) -> Arc<$ty> {
                Arc::clone(&self.metrics.read().$field)
            }
        )*
    };
}

impl DefaultMetricCollector {
    /// Create a collector for the named resource
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), metrics: RwLock::new(Accumulators::default()) }
    }

    /// Factory suitable for [`CollectorRegistry::register_factory`](super::CollectorRegistry::register_factory)
    pub fn factory() -> CollectorFactory {
        Arc::new(|name: &str| -> Box<dyn MetricCollector> { Box::new(Self::new(name)) })
    }

    accumulator_accessors! {
        /// Attempted executions
        num_requests -> Number;
        /// Executions that ended in any kind of error
        errors -> Number;
        /// Executions that succeeded
        successes -> Number;
        /// Executions whose function returned an error
        failures -> Number;
        /// Executions rejected for lack of capacity
        rejects -> Number;
        /// Executions refused by an open circuit
        short_circuits -> Number;
        /// Executions that timed out
        timeouts -> Number;
        /// Fallbacks that succeeded
        fallback_successes -> Number;
        /// Fallbacks that failed
        fallback_failures -> Number;
        /// Executions whose context was canceled
        context_canceled -> Number;
        /// Executions whose context deadline passed
        context_deadline_exceeded -> Number;
        /// Peak concurrency reported by outcomes; read with [`Number::max`]
        concurrency_in_use -> Number;
        /// Submission-to-completion durations
        total_duration -> Timing;
        /// Durations of the protected function itself
        run_duration -> Timing;
    }

    /// Name of the resource this collector observes
    pub fn resource(&self) -> &str {
        &self.name
    }

    /// Consistent copy of every current value
    ///
    /// Taken under one read lock, so a concurrent reset cannot mix windows.
    pub fn snapshot(&self) -> CollectorSnapshot {
        let metrics = self.metrics.read();
        CollectorSnapshot {
            name: self.name.clone(),
            num_requests: metrics.num_requests.sum(),
            errors: metrics.errors.sum(),
            successes: metrics.successes.sum(),
            failures: metrics.failures.sum(),
            rejects: metrics.rejects.sum(),
            short_circuits: metrics.short_circuits.sum(),
            timeouts: metrics.timeouts.sum(),
            fallback_successes: metrics.fallback_successes.sum(),
            fallback_failures: metrics.fallback_failures.sum(),
            context_canceled: metrics.context_canceled.sum(),
            context_deadline_exceeded: metrics.context_deadline_exceeded.sum(),
            max_concurrency_in_use: metrics.concurrency_in_use.max(),
            total_duration: metrics.total_duration.snapshot(),
            run_duration: metrics.run_duration.snapshot(),
        }
    }
}

impl MetricCollector for DefaultMetricCollector {
    fn update(&self, outcome: &MetricOutcome) {
        self.metrics.read().apply(outcome);
    }

    fn reset(&self) {
        *self.metrics.write() = Accumulators::default();
        debug!(resource = %self.name, "Reset default metric collector");
    }

    fn name(&self) -> &str {
        "default"
    }
}

impl fmt::Debug for DefaultMetricCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metrics = self.metrics.read();
        f.debug_struct("DefaultMetricCollector")
            .field("resource", &self.name)
            .field("num_requests", &metrics.num_requests.sum())
            .field("errors", &metrics.errors.sum())
            .finish_non_exhaustive()
    }
}

/// Point-in-time values of a [`DefaultMetricCollector`], for exporters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollectorSnapshot {
    pub name: String,
    pub num_requests: f64,
    pub errors: f64,
    pub successes: f64,
    pub failures: f64,
    pub rejects: f64,
    pub short_circuits: f64,
    pub timeouts: f64,
    pub fallback_successes: f64,
    pub fallback_failures: f64,
    pub context_canceled: f64,
    pub context_deadline_exceeded: f64,
    pub max_concurrency_in_use: f64,
    pub total_duration: TimingSnapshot,
    pub run_duration: TimingSnapshot,
}

impl CollectorSnapshot {
    /// Share of attempts that ended in error, as a percentage (0.0 to 100.0)
    pub fn error_percentage(&self) -> f64 {
        if self.num_requests <= 0.0 {
            return 0.0;
        }
        self.errors / self.num_requests * 100.0
    }
}
