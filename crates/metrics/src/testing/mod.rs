//! Testing utilities and helpers
//!
//! - **[`mocks`]**: a [`RecordingCollector`] that remembers everything it is
//!   told
//! - **[`async_utils`]**: polling assertions for background consumers
//!
//! ## Usage
//!
//! ```rust
//! use faultline_metrics::testing::RecordingCollector;
//! use faultline_metrics::{MetricCollector, MetricOutcome};
//!
//! let recorder = RecordingCollector::new("recorder");
//! recorder.update(&MetricOutcome::rejected());
//! assert_eq!(recorder.update_count(), 1);
//! ```

#[cfg(feature = "runtime")]
pub mod async_utils;
pub mod mocks;

#[cfg(feature = "runtime")]
pub use async_utils::timeout_ok;
pub use mocks::RecordingCollector;
