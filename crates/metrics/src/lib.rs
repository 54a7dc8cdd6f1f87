//! Metrics collection core for Faultline circuit breakers.
//!
//! Every protected call produces a [`MetricOutcome`]. The outcome is fanned
//! out to the [`MetricCollector`]s that the [`CollectorRegistry`] created for
//! that resource, and each collector folds it into its own accumulators.
//! Pools report their instantaneous concurrency to a [`PoolUsageTracker`],
//! whose single background consumer keeps the dispatch path free of metric
//! locks.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: accumulators, errors, configuration
//! - `observability`: outcomes, collectors, the registry (adds tracing)
//! - `runtime`: the tokio-backed pool usage tracker (default)
//! - `serde`: serialization derives on snapshot types
//! - `test-utils`: mock collectors and async assertions

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod accumulator;
#[cfg(feature = "foundation")]
pub mod config;
#[cfg(feature = "foundation")]
pub mod error;

// Observability tier
// --------------------------------------------------------------
#[cfg(feature = "observability")]
pub mod collector;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod pool;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "observability")))]
pub mod testing;

// Re-export commonly used types
// ------------------------
#[cfg(feature = "foundation")]
pub use accumulator::{Number, Percentiles, Timing, TimingSnapshot};
#[cfg(feature = "observability")]
pub use collector::{
    CollectorFactory, CollectorRegistry, CollectorSet, CollectorSnapshot, DefaultMetricCollector,
    MetricCollector, MetricOutcome, MetricOutcomeBuilder,
};
#[cfg(feature = "foundation")]
pub use config::{MetricsConfig, PoolTrackerConfig};
#[cfg(feature = "foundation")]
pub use error::{ConfigError, MetricsError, MetricsResult};
#[cfg(feature = "runtime")]
pub use pool::{PoolUsageSender, PoolUsageSnapshot, PoolUsageTracker, PoolUsageUpdate};
