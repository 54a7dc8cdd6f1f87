//! Async testing utilities
//!
//! Pool usage is consumed on a background task, so assertions about its
//! counters have to poll.

#![allow(clippy::missing_errors_doc)]

use std::future::Future;
use std::time::Duration;

/// Assert that an async condition becomes true within a timeout
///
/// Polls every 10ms.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use faultline_metrics::PoolUsageTracker;
///
/// #[tokio::test(flavor = "multi_thread")]
/// async fn test_usage_is_consumed() {
///     let tracker = PoolUsageTracker::new("workers");
///     tracker.sender().send(3).await.unwrap();
///
///     faultline_metrics::assert_eventually_async!(Duration::from_secs(1), async {
///         tracker.executed().sum() == 1.0
///     });
/// }
/// ```
#[macro_export]
macro_rules! assert_eventually_async {
    ($timeout:expr, $fut:expr) => {{
        let timeout_duration = $timeout;
        let result = tokio::time::timeout(timeout_duration, async {
            loop {
                if $fut.await {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await;

        assert!(result.is_ok(), "Condition did not become true within {:?}", timeout_duration);
    }};
}

/// Await `fut`, giving up after `duration`
pub async fn timeout_ok<F, T>(duration: Duration, fut: F) -> Result<T, tokio::time::error::Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, fut).await
}
