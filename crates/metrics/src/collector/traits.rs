//! Collector abstraction shared by the default collector and external backends

use std::fmt::Debug;
use std::sync::Arc;

use super::outcome::MetricOutcome;

/// Subscriber to the stream of outcomes for one resource
///
/// Implementations must accept `update` concurrently with itself and with
/// `reset`. Neither call may fail or block beyond short lock acquisition.
pub trait MetricCollector: Send + Sync + Debug {
    /// Fold one outcome into the collector's metrics
    fn update(&self, outcome: &MetricOutcome);

    /// Start a new window: discard everything collected so far
    fn reset(&self);

    /// Backend name used in logs
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<T: MetricCollector + ?Sized> MetricCollector for Arc<T> {
    fn update(&self, outcome: &MetricOutcome) {
        (**self).update(outcome);
    }

    fn reset(&self) {
        (**self).reset();
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: MetricCollector + ?Sized> MetricCollector for Box<T> {
    fn update(&self, outcome: &MetricOutcome) {
        (**self).update(outcome);
    }

    fn reset(&self) {
        (**self).reset();
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Constructor registered with a [`CollectorRegistry`](super::CollectorRegistry)
///
/// Called once per resource with the resource name.
pub type CollectorFactory = Arc<dyn Fn(&str) -> Box<dyn MetricCollector> + Send + Sync>;
