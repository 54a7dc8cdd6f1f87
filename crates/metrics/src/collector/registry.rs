//! Registry of collector factories
//!
//! Backends register a factory once, during process initialization. Every
//! resource created afterwards asks the registry for its collectors and gets
//! one fresh instance per factory. Resources created before a registration do
//! not gain a collector retroactively.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use super::default::DefaultMetricCollector;
use super::traits::{CollectorFactory, MetricCollector};

/// Ordered, append-only list of collector factories
///
/// Pass a `&CollectorRegistry` to whatever creates resources. Use
/// [`CollectorRegistry::global`] when the whole process should share one.
///
/// # Examples
///
/// ```rust
/// use faultline_metrics::{CollectorRegistry, MetricOutcome};
///
/// let registry = CollectorRegistry::new();
/// registry.register_default();
///
/// let collectors = registry.initialize_metric_collectors("payments");
/// assert_eq!(collectors.len(), 1);
///
/// for collector in &collectors {
///     collector.update(&MetricOutcome::rejected());
/// }
/// ```
#[derive(Default)]
pub struct CollectorRegistry {
    factories: RwLock<Vec<CollectorFactory>>,
}

impl CollectorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created empty on first use
    ///
    /// Register backends before creating the resources they should observe.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<CollectorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Append a factory
    ///
    /// Registering the same factory twice yields two independent collectors
    /// per resource.
    pub fn register<F>(&self, factory: F)
    where
        F: Fn(&str) -> Box<dyn MetricCollector> + Send + Sync + 'static,
    {
        self.register_factory(Arc::new(factory));
    }

    /// Append an already shared factory
    pub fn register_factory(&self, factory: CollectorFactory) {
        let mut factories = self.factories.write();
        factories.push(factory);
        debug!(factories = factories.len(), "Registered metric collector factory");
    }

    /// Register the in-process [`DefaultMetricCollector`]
    pub fn register_default(&self) {
        self.register_factory(DefaultMetricCollector::factory());
    }

    /// Create one collector per registered factory, in registration order
    ///
    /// Call once per resource when it is created. The registry keeps no
    /// reference to the returned collectors.
    pub fn initialize_metric_collectors(&self, name: &str) -> Vec<Box<dyn MetricCollector>> {
        let factories = self.factories.read();
        let collectors: Vec<_> = factories.iter().map(|factory| factory(name)).collect();
        debug!(resource = name, collectors = collectors.len(), "Initialized metric collectors");
        collectors
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// Whether no factory has been registered
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorRegistry").field("factories", &self.len()).finish()
    }
}
