//! Outcome of one protected call, as reported to collectors

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of one protected call
///
/// Counts are `f64` so batched reports can add more than one at a time; a
/// single call normally sets each relevant field to `1.0`. Every field
/// defaults to zero and a zero field has no effect on any collector, so
/// partial outcomes are always safe to report.
///
/// Rejected, short-circuited and fallback calls are reported through their
/// own fields. They are outcomes, not the absence of one.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use faultline_metrics::MetricOutcome;
///
/// let outcome = MetricOutcome::builder()
///     .attempts(1.0)
///     .failures(1.0)
///     .errors(1.0)
///     .fallback_successes(1.0)
///     .total_duration(Duration::from_millis(12))
///     .build();
///
/// assert_eq!(outcome.fallback_successes, 1.0);
/// assert_eq!(outcome.successes, 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MetricOutcome {
    pub attempts: f64,
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
    /// Wall time from submission to completion, including queueing
    pub total_duration: Duration,
    /// Time spent running the protected function itself
    pub run_duration: Duration,
    /// Concurrent executions in flight when the call finished
    pub concurrency_in_use: f64,
}

impl MetricOutcome {
    /// Start building an outcome from all-zero fields
    pub fn builder() -> MetricOutcomeBuilder {
        MetricOutcomeBuilder::default()
    }

    /// One attempt that succeeded after `run` (total equals run)
    pub fn success(run: Duration) -> Self {
        Self {
            attempts: 1.0,
            successes: 1.0,
            total_duration: run,
            run_duration: run,
            ..Self::default()
        }
    }

    /// One attempt whose function returned an error after `run`
    pub fn failure(run: Duration) -> Self {
        Self {
            attempts: 1.0,
            errors: 1.0,
            failures: 1.0,
            total_duration: run,
            run_duration: run,
            ..Self::default()
        }
    }

    /// One attempt abandoned after `timeout`
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            attempts: 1.0,
            errors: 1.0,
            timeouts: 1.0,
            total_duration: timeout,
            ..Self::default()
        }
    }

    /// One attempt rejected because the pool had no capacity
    pub fn rejected() -> Self {
        Self { attempts: 1.0, errors: 1.0, rejects: 1.0, ..Self::default() }
    }

    /// One attempt refused because the circuit was open
    pub fn short_circuited() -> Self {
        Self { attempts: 1.0, errors: 1.0, short_circuits: 1.0, ..Self::default() }
    }

    /// Whether reporting this outcome would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fluent builder for [`MetricOutcome`]
#[derive(Debug, Clone, Copy, Default)]
#[must_use = "call build() to obtain the outcome"]
pub struct MetricOutcomeBuilder {
    outcome: MetricOutcome,
}

macro_rules! outcome_setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Set `", stringify!($field), "`")]
            pub fn $field(mut self, value: $ty) -> Self {
                self.outcome.$field = value;
                self
            }
        )*
    };
}

impl MetricOutcomeBuilder {
    outcome_setters! {
        attempts: f64,
        errors: f64,
        successes: f64,
        failures: f64,
        rejects: f64,
        short_circuits: f64,
        timeouts: f64,
        fallback_successes: f64,
        fallback_failures: f64,
        context_canceled: f64,
        context_deadline_exceeded: f64,
        total_duration: Duration,
        run_duration: Duration,
        concurrency_in_use: f64,
    }

    /// Finish building
    pub fn build(self) -> MetricOutcome {
        self.outcome
    }
}
