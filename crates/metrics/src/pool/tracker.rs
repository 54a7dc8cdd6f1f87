//! Channel-fed pool usage tracker
//!
//! Producers push the pool's instantaneous active count on every dispatch.
//! One consumer task per tracker folds the samples into two accumulators, so
//! the dispatch path never touches a metrics lock.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::accumulator::Number;
use crate::config::PoolTrackerConfig;
use crate::error::{MetricsError, MetricsResult};

/// One pool usage sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolUsageUpdate {
    /// Requests executing in the pool when the sample was taken
    pub active_count: usize,
}

/// Point-in-time view of a tracker's accumulators
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolUsageSnapshot {
    pub executed: f64,
    pub max_active_requests: f64,
}

#[derive(Debug, Default)]
struct Usage {
    executed: Arc<Number>,
    max_active_requests: Arc<Number>,
}

impl Usage {
    fn apply(&self, update: PoolUsageUpdate) {
        self.executed.increment(1.0);
        self.max_active_requests.update_max(update.active_count as f64);
    }
}

/// Cloneable producer side of a [`PoolUsageTracker`]
#[derive(Clone)]
pub struct PoolUsageSender {
    name: Arc<str>,
    tx: mpsc::Sender<PoolUsageUpdate>,
    closed: Arc<AtomicBool>,
}

impl PoolUsageSender {
    /// Push a sample, waiting while the channel is full
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::TrackerClosed`] once the tracker is closed.
    pub async fn send(&self, active_count: usize) -> MetricsResult<()> {
        if self.is_closed() {
            return Err(self.rejected());
        }
        self.tx.send(PoolUsageUpdate { active_count }).await.map_err(|_| self.rejected())
    }

    /// Push a sample from a synchronous thread, blocking while the channel is
    /// full
    ///
    /// Must not be called from inside an async task.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::TrackerClosed`] once the tracker is closed.
    pub fn blocking_send(&self, active_count: usize) -> MetricsResult<()> {
        if self.is_closed() {
            return Err(self.rejected());
        }
        self.tx.blocking_send(PoolUsageUpdate { active_count }).map_err(|_| self.rejected())
    }

    /// Whether the tracker has stopped accepting samples
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.tx.is_closed()
    }

    fn rejected(&self) -> MetricsError {
        warn!(pool = %self.name, "Dropped pool usage sample: tracker is closed");
        MetricsError::tracker_closed(&*self.name)
    }
}

impl fmt::Debug for PoolUsageSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolUsageSender")
            .field("pool", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Tracks how many requests a pool executed and its peak concurrency
///
/// # Examples
///
/// ```rust
/// use faultline_metrics::PoolUsageTracker;
///
/// # #[tokio::main]
/// # async fn main() -> faultline_metrics::MetricsResult<()> {
/// let mut tracker = PoolUsageTracker::new("workers");
/// let sender = tracker.sender();
///
/// for active in [2, 5, 3] {
///     sender.send(active).await?;
/// }
/// tracker.shutdown().await?;
///
/// assert_eq!(tracker.executed().sum(), 3.0);
/// assert_eq!(tracker.max_active_requests().max(), 5.0);
/// # Ok(())
/// # }
/// ```
pub struct PoolUsageTracker {
    name: Arc<str>,
    usage: Arc<RwLock<Usage>>,
    sender: PoolUsageSender,
    closed: Arc<AtomicBool>,
    close: Arc<Notify>,
    consumer: Option<JoinHandle<()>>,
}

impl PoolUsageTracker {
    /// Create a tracker with the default configuration
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. Threads without one should
    /// use [`with_config`](Self::with_config) or
    /// [`on_runtime`](Self::on_runtime).
    pub fn new(name: impl Into<String>) -> Self {
        Self::start(name.into(), &PoolTrackerConfig::default(), &Handle::current())
    }

    /// Create a tracker with an explicit configuration on the current runtime
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Config`] if the configuration is invalid and
    /// [`MetricsError::NoRuntime`] when called outside a Tokio runtime.
    pub fn with_config(name: impl Into<String>, config: PoolTrackerConfig) -> MetricsResult<Self> {
        let name = name.into();
        config.validate()?;
        match Handle::try_current() {
            Ok(runtime) => Ok(Self::start(name, &config, &runtime)),
            Err(_) => Err(MetricsError::NoRuntime { name }),
        }
    }

    /// Create a tracker whose consumer runs on `runtime`
    ///
    /// Works from any thread, including synchronous dispatch threads.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Config`] if the configuration is invalid.
    pub fn on_runtime(
        name: impl Into<String>,
        config: PoolTrackerConfig,
        runtime: &Handle,
    ) -> MetricsResult<Self> {
        config.validate()?;
        Ok(Self::start(name.into(), &config, runtime))
    }

    fn start(name: String, config: &PoolTrackerConfig, runtime: &Handle) -> Self {
        let name: Arc<str> = Arc::from(name);
        let usage = Arc::new(RwLock::new(Usage::default()));
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let closed = Arc::new(AtomicBool::new(false));
        let close = Arc::new(Notify::new());

        let consumer = runtime.spawn(Self::consume(
            Arc::clone(&name),
            rx,
            Arc::clone(&usage),
            Arc::clone(&close),
        ));

        Self {
            sender: PoolUsageSender { name: Arc::clone(&name), tx, closed: Arc::clone(&closed) },
            name,
            usage,
            closed,
            close,
            consumer: Some(consumer),
        }
    }

    async fn consume(
        name: Arc<str>,
        mut rx: mpsc::Receiver<PoolUsageUpdate>,
        usage: Arc<RwLock<Usage>>,
        close: Arc<Notify>,
    ) {
        debug!(pool = %name, "Pool usage consumer started");

        loop {
            tokio::select! {
                update = rx.recv() => match update {
                    Some(update) => {
                        usage.read().apply(update);
                    }
                    None => break,
                },
                () = close.notified() => {
                    rx.close();
                    while let Some(update) = rx.recv().await {
                        usage.read().apply(update);
                    }
                    break;
                }
            }
        }

        debug!(pool = %name, "Pool usage consumer stopped");
    }

    /// Pool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Producer handle; clone it freely
    pub fn sender(&self) -> PoolUsageSender {
        self.sender.clone()
    }

    /// Push a sample through the tracker's own sender
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::TrackerClosed`] once the tracker is closed.
    pub async fn send(&self, active_count: usize) -> MetricsResult<()> {
        self.sender.send(active_count).await
    }

    /// Start a new window
    ///
    /// Samples already queued are folded into the new window.
    pub fn reset(&self) {
        *self.usage.write() = Usage::default();
        debug!(pool = %self.name, "Reset pool usage");
    }

    /// Number of samples consumed since the last reset
    pub fn executed(&self) -> Arc<Number> {
        Arc::clone(&self.usage.read().executed)
    }

    /// Largest active count consumed since the last reset
    pub fn max_active_requests(&self) -> Arc<Number> {
        Arc::clone(&self.usage.read().max_active_requests)
    }

    /// Read both accumulators under one lock
    pub fn snapshot(&self) -> PoolUsageSnapshot {
        let usage = self.usage.read();
        PoolUsageSnapshot {
            executed: usage.executed.sum(),
            max_active_requests: usage.max_active_requests.max(),
        }
    }

    /// Stop accepting samples
    ///
    /// Sends issued after this call fail with
    /// [`MetricsError::TrackerClosed`]. The consumer drains whatever is
    /// already queued, then exits.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.close.notify_one();
    }

    /// Whether the consumer task has exited
    pub fn is_finished(&self) -> bool {
        self.consumer.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Close the tracker and wait for the consumer to drain and exit
    ///
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::ConsumerFailed`] if the consumer task panicked.
    pub async fn shutdown(&mut self) -> MetricsResult<()> {
        self.close();

        if let Some(handle) = self.consumer.take() {
            handle.await.map_err(|source| MetricsError::ConsumerFailed {
                name: self.name.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for PoolUsageTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolUsageTracker")
            .field("pool", &self.name)
            .field("usage", &self.snapshot())
            .field("finished", &self.is_finished())
            .finish()
    }
}
