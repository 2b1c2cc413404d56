//! Retry configuration for record fetches.

use std::time::Duration;

/// Configuration for automatic retry of failed fetches.
///
/// Only errors for which [`SourceError::is_retryable`](crate::SourceError::is_retryable)
/// holds are retried.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use portal_grid::RetryConfig;
///
/// let config = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(200));
///
/// let no_retry = RetryConfig::no_retry();
/// assert_eq!(no_retry.max_retries, 0);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Initial delay between retries (doubles each attempt).
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Creates a config with retries disabled.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Sets the initial delay between retries.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}
