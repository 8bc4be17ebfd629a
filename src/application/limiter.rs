//! Minimum-interval call limiter.
//!
//! Enforces a fixed spacing between consecutive calls, measured from call
//! start to call start. Unlike a token bucket there is no burst allowance:
//! the contract is simply "never two calls closer together than the
//! configured interval".
//!
//! The limiter is a serialization point, not an advisory delay: the
//! read-wait-write region runs under a single async mutex, so concurrent
//! callers queue rather than racing past the elapsed-time check.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Serializes calls so that consecutive starts are at least `min_interval`
/// apart.
pub struct MinIntervalLimiter {
    /// Completion time of the most recent call; `None` before the first
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl MinIntervalLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_interval,
        }
    }

    /// Run `call` under the rate limit.
    ///
    /// Holds the limiter lock for the full wait-call-update region. The
    /// timestamp is updated to the completion time whether the call
    /// succeeded or failed, which keeps the start-to-start gap at or above
    /// `min_interval` for every pair of consecutive calls.
    pub async fn throttle<T, F>(&self, call: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }

        let output = call.await;
        *last_call = Some(Instant::now());
        output
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
