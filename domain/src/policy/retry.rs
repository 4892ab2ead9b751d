//! Retry policies for transient model failures

use std::time::Duration;

/// How many times to retry a transient failure and how long to wait.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    fn max_retries(&self) -> u32;

    /// Delay before retry number `attempt` (1-based).
    fn delay_for(&self, attempt: u32) -> Duration;
}

/// `base * factor^(attempt - 1)`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    pub max_retries: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            factor: 2.0,
            max_delay: Duration::from_millis(5000),
            max_retries: 3,
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let scaled_ms = self.base.as_millis() as f64 * self.factor.max(1.0).powi(exponent);
        if !scaled_ms.is_finite() || scaled_ms >= self.max_delay.as_millis() as f64 {
            self.max_delay
        } else {
            Duration::from_millis(scaled_ms.round() as u64)
        }
    }
}

/// Fail on the first transient error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn max_retries(&self) -> u32 {
        0
    }

    fn delay_for(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}
