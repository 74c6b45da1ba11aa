use std::time::Duration;

use async_trait::async_trait;

/// Suspends a delivery between attempts.
///
/// The retry loop never touches the clock directly, so tests can substitute a
/// sleeper that records the requested delays and returns immediately.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the calling task for `delay`.
    async fn sleep(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
