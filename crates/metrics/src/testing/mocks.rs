//! Mock collectors

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use parking_lot::Mutex;

use crate::collector::{MetricCollector, MetricOutcome};

#[derive(Debug, Default)]
struct Recording {
    outcomes: Vec<MetricOutcome>,
    resets: usize,
    resources: Vec<String>,
}

/// Collector that records every call it receives
///
/// Clones share the same recording, so a test can keep one handle while the
/// registry or a [`CollectorSet`](crate::CollectorSet) owns another.
///
/// # Examples
///
/// ```
/// use faultline_metrics::testing::RecordingCollector;
/// use faultline_metrics::{CollectorRegistry, MetricOutcome};
///
/// let recorder = RecordingCollector::new("recorder");
/// let shared = recorder.clone();
///
/// let registry = CollectorRegistry::new();
/// registry.register(move |_| Box::new(shared.clone()));
///
/// for collector in registry.initialize_metric_collectors("svc") {
///     collector.update(&MetricOutcome::rejected());
/// }
/// assert_eq!(recorder.outcomes(), vec![MetricOutcome::rejected()]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordingCollector {
    label: Arc<str>,
    recording: Arc<Mutex<Recording>>,
}

impl RecordingCollector {
    /// Create a recorder reporting `label` as its name
    pub fn new(label: &str) -> Self {
        Self { label: Arc::from(label), recording: Arc::new(Mutex::new(Recording::default())) }
    }

    /// Create a recorder for `resource` and note the resource name
    pub fn labelled(label: &str, resource: &str) -> Self {
        let recorder = Self::new(label);
        recorder.record_resource(resource);
        recorder
    }

    /// Note that a factory was asked for `resource`
    pub fn record_resource(&self, resource: &str) {
        self.recording.lock().resources.push(resource.to_string());
    }

    /// Resource names noted so far, in order
    pub fn resources(&self) -> Vec<String> {
        self.recording.lock().resources.clone()
    }

    /// Outcomes received since creation, resets included
    pub fn outcomes(&self) -> Vec<MetricOutcome> {
        self.recording.lock().outcomes.clone()
    }

    /// Number of `update` calls received
    pub fn update_count(&self) -> usize {
        self.recording.lock().outcomes.len()
    }

    /// Number of `reset` calls received
    pub fn reset_count(&self) -> usize {
        self.recording.lock().resets
    }
}

impl MetricCollector for RecordingCollector {
    fn update(&self, outcome: &MetricOutcome) {
        self.recording.lock().outcomes.push(*outcome);
    }

    fn reset(&self) {
        self.recording.lock().resets += 1;
    }

    fn name(&self) -> &str {
        &self.label
    }
}
