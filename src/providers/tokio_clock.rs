//! Tokio-based clock implementation.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::traits::Clock;

/// Wall clock for production use.
///
/// Commit ages and attestation back-off read real time; tests use
/// [`FakeClock`](crate::testing::FakeClock) to fast-forward instead.
///
/// # Examples
///
/// ```rust
/// use ccip_rs::{Clock, TokioClock};
///
/// let start = TokioClock.now();
/// assert!(TokioClock.now() >= start);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}
