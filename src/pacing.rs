use async_trait::async_trait;
use std::time::Duration;

/// Throttle applied between consecutive catalog requests
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait before the next unit of work may start
    async fn pause(&self);
}

/// Flat sleep of a fixed length
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self(delay)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fixed_delay_waits() {
        let pacer = FixedDelay::new(Duration::from_millis(20));
        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let start = Instant::now();
        FixedDelay::default().pause().await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }
}
