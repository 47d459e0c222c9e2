//! Retry strategy and scheduling for webhook delivery.

use std::time::Duration;

use async_trait::async_trait;

/// Trait for retry strategies.
pub trait RetryStrategy: Send + Sync {
    /// Returns the delay before the next attempt, or None if the attempt
    /// budget is spent.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Returns the maximum number of attempts.
    fn max_attempts(&self) -> u32;
}

/// Exponential backoff retry strategy.
///
/// Delay doubles per attempt: base * 2^(attempt - 1), capped at
/// `max_delay`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Base delay.
    pub base: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    /// Maximum number of attempts.
    pub max_attempts: u32,
}

impl ExponentialBackoff {
    /// Creates the default strategy: 3 attempts, 1s base, 60s cap.
    pub fn new() -> Self {
        Self {
            base: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_attempts: 3,
        }
    }

    /// Sets the base delay.
    pub fn base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    /// Sets the maximum delay.
    pub fn max_delay(mut self, max: Duration) -> Self {
        self.max_delay = max;
        self
    }

    /// Sets the maximum attempts.
    pub fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }

        let multiplier = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.base.saturating_mul(multiplier);
        Some(std::cmp::min(delay, self.max_delay))
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Scheduling seam for backoff waits, injectable so tests run instantly.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Waits for the given delay.
    async fn sleep(&self, delay: Duration);
}

/// Production scheduler backed by the tokio timer. The wait is dropped
/// with its task on shutdown, so backoff never pins a stopping process.
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Scheduler that returns immediately. For tests.
pub struct NoopScheduler;

#[async_trait]
impl Scheduler for NoopScheduler {
    async fn sleep(&self, _delay: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let strategy = ExponentialBackoff::new()
            .base(Duration::from_secs(1))
            .max_attempts(4);

        assert_eq!(strategy.next_delay(1), Some(Duration::from_secs(1)));
        assert_eq!(strategy.next_delay(2), Some(Duration::from_secs(2)));
        assert_eq!(strategy.next_delay(3), Some(Duration::from_secs(4)));
        assert_eq!(strategy.next_delay(4), None);
    }

    #[test]
    fn test_backoff_respects_cap() {
        let strategy = ExponentialBackoff::new()
            .base(Duration::from_secs(30))
            .max_delay(Duration::from_secs(45))
            .max_attempts(3);

        assert_eq!(strategy.next_delay(1), Some(Duration::from_secs(30)));
        assert_eq!(strategy.next_delay(2), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_default_budget_is_three_attempts() {
        let strategy = ExponentialBackoff::new();
        assert_eq!(strategy.max_attempts, 3);
        assert!(strategy.next_delay(1).is_some());
        assert!(strategy.next_delay(2).is_some());
        assert_eq!(strategy.next_delay(3), None);
    }

    #[test]
    fn test_attempt_zero_has_no_delay() {
        assert_eq!(ExponentialBackoff::new().next_delay(0), None);
    }
}
