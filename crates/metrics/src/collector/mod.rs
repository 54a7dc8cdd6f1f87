//! Outcome collectors and the registry that creates them
//!
//! This module consolidates the collection path:
//! - [`outcome`]: the value reported after every protected call
//! - [`traits`]: the [`MetricCollector`] abstraction backends implement
//! - [`registry`]: factories that create collectors per resource
//! - [`default`]: the in-process collector
//! - [`set`]: the per-resource fan-out
//!
//! ## Data Flow
//!
//! ```text
//! executor ── MetricOutcome ──► CollectorSet ──► DefaultMetricCollector
//!                                    │
//!                                    └─────────► any registered backend
//! ```

pub mod default;
pub mod outcome;
pub mod registry;
pub mod set;
pub mod traits;

pub use default::{CollectorSnapshot, DefaultMetricCollector};
pub use outcome::{MetricOutcome, MetricOutcomeBuilder};
pub use registry::CollectorRegistry;
pub use set::CollectorSet;
pub use traits::{CollectorFactory, MetricCollector};
