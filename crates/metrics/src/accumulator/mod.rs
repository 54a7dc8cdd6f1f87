//! Thread-safe accumulators shared by collectors and pool trackers
//!
//! - [`Number`]: running total plus running maximum, used for counts
//! - [`Timing`]: duration samples with count, sum, min, max and percentiles
//!
//! Neither type has a reset. Owners replace an accumulator with a fresh one
//! instead, so anyone still holding the old handle keeps reading the value it
//! had at the moment of the swap.

pub mod number;
pub mod timing;

pub use number::Number;
pub use timing::{Percentiles, Timing, TimingSnapshot};
