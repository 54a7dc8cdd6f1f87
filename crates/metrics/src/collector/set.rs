//! Per-resource bundle of collectors

use std::fmt;

use tracing::debug;

use super::outcome::MetricOutcome;
use super::registry::CollectorRegistry;
use super::traits::MetricCollector;

/// The collectors one resource reports to
///
/// Built once, when the resource is created, from whatever the registry holds
/// at that moment. Owned by the resource for its whole lifetime.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use faultline_metrics::{CollectorRegistry, CollectorSet, MetricOutcome};
///
/// let registry = CollectorRegistry::new();
/// registry.register_default();
///
/// let collectors = CollectorSet::initialize(&registry, "inventory");
/// collectors.update(&MetricOutcome::success(Duration::from_millis(4)));
/// collectors.reset();
/// ```
pub struct CollectorSet {
    name: String,
    collectors: Vec<Box<dyn MetricCollector>>,
}

impl CollectorSet {
    /// Ask the registry for one collector per registered factory
    pub fn initialize(registry: &CollectorRegistry, name: impl Into<String>) -> Self {
        let name = name.into();
        let collectors = registry.initialize_metric_collectors(&name);
        Self { name, collectors }
    }

    /// Wrap collectors that were created elsewhere
    pub fn from_collectors(
        name: impl Into<String>,
        collectors: Vec<Box<dyn MetricCollector>>,
    ) -> Self {
        Self { name: name.into(), collectors }
    }

    /// Report one outcome to every collector, in registration order
    pub fn update(&self, outcome: &MetricOutcome) {
        for collector in &self.collectors {
            collector.update(outcome);
        }
    }

    /// Reset every collector
    pub fn reset(&self) {
        for collector in &self.collectors {
            collector.reset();
        }
        debug!(resource = %self.name, collectors = self.collectors.len(), "Reset collector set");
    }

    /// Resource name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of collectors
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    /// Whether the resource reports to nobody
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Iterate over the collectors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn MetricCollector> {
        self.collectors.iter().map(|collector| collector.as_ref())
    }
}

impl fmt::Debug for CollectorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.collectors.iter().map(|c| c.name()).collect();
        f.debug_struct("CollectorSet").field("name", &self.name).field("collectors", &names).finish()
    }
}
