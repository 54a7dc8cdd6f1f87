//! Pool usage tracking
//!
//! Worker pools report their active request count through a
//! [`PoolUsageSender`]. A single consumer task per [`PoolUsageTracker`] turns
//! the samples into an executed count and a concurrency peak.

pub mod tracker;

pub use tracker::{PoolUsageSender, PoolUsageSnapshot, PoolUsageTracker, PoolUsageUpdate};
