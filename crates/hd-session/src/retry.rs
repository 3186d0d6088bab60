//! Bounded-retry combinator with an injectable sleep.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

/// Sleep abstraction so retry behavior is testable without real delays.
#[async_trait]
pub trait Sleep: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleep backed by the tokio timer.
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// No-op sleep for tests.
pub struct NoopSleep;

#[async_trait]
impl Sleep for NoopSleep {
    async fn sleep(&self, _duration: Duration) {}
}

/// Run `op` up to `max_attempts` times and return the first value
/// produced. Every failed attempt is followed by the fixed `delay`,
/// including the final one, so giving up takes the full poll window.
///
/// Attempts are strictly sequential.
pub async fn poll_until<T, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    sleeper: &dyn Sleep,
    mut op: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for _ in 0..max_attempts {
        if let Some(value) = op().await {
            return Some(value);
        }
        sleeper.sleep(delay).await;
    }
    None
}
