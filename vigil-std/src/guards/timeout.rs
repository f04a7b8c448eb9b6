//! Timeout guard for latency-bounded validity checks.

use std::time::Duration;
use tokio::time::timeout;
use vigil_core::ContextGuard;

/// A guard that wraps another guard with a timeout.
///
/// A check that does not answer within `duration` counts as invalid, so a
/// stalled backing store cancels the instances depending on it instead of
/// stalling the matcher.
pub struct TimeoutGuard<G> {
    inner: G,
    duration: Duration,
}

impl<G> TimeoutGuard<G> {
    /// Create a new timeout guard.
    pub fn new(inner: G, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// Create a timeout guard with the bound given in milliseconds.
    pub fn millis(inner: G, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// The configured bound.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<G: ContextGuard> ContextGuard for TimeoutGuard<G> {
    async fn is_valid(&self) -> bool {
        match timeout(self.duration, self.inner.is_valid()).await {
            Ok(valid) => valid,
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(timeout = ?self.duration, "context check timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    impl ContextGuard for Slow {
        async fn is_valid(&self) -> bool {
            tokio::time::sleep(Duration::from_secs(60)).await;
            true
        }
    }

    #[tokio::test]
    async fn test_fast_guard_passes_through() {
        let guard = TimeoutGuard::millis(crate::guards::FlagGuard::new(true), 50);
        assert!(guard.is_valid().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_guard_is_invalid() {
        let guard = TimeoutGuard::millis(Slow, 10);
        assert!(!guard.is_valid().await);
    }
}
