//! Retry policy with exponential backoff and jitter.
//!
//! Only requests that never produced an HTTP response are retried; see
//! [`ErrorKind::is_retryable`](crate::ErrorKind::is_retryable).

use rand::Rng;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the first try).
    pub max_attempts: u32,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff strategy to use.
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            backoff: BackoffStrategy::ExponentialWithJitter { factor: 2.0 },
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of retries.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Cap the delay between retries.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// A config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }
}

/// Backoff strategy for determining retry delays.
#[derive(Debug, Clone, Copy)]
pub enum BackoffStrategy {
    /// Constant delay between retries.
    Constant,
    /// Exponential increase in delay (delay * factor^attempt).
    Exponential { factor: f64 },
    /// Exponential with random jitter so parallel callers spread out.
    ExponentialWithJitter { factor: f64 },
}

impl BackoffStrategy {
    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay(&self, attempt: u32, initial_delay: Duration, max_delay: Duration) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = match self {
            BackoffStrategy::Constant => return std::cmp::min(initial_delay, max_delay),
            BackoffStrategy::Exponential { factor } => {
                initial_delay.as_secs_f64() * factor.powi(exponent)
            }
            BackoffStrategy::ExponentialWithJitter { factor } => {
                let base_delay = initial_delay.as_secs_f64() * factor.powi(exponent);
                base_delay + rand::rng().random::<f64>() * base_delay
            }
        };

        // Large attempt counts overflow to infinity; those cap at `max_delay`.
        Duration::try_from_secs_f64(secs)
            .map_or(max_delay, |delay| std::cmp::min(delay, max_delay))
    }
}

/// Tracks the attempts of one logical request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Number of retries taken so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns true if another retry is allowed.
    pub fn should_retry(&self) -> bool {
        self.attempt < self.config.max_attempts
    }

    /// Record a retry and return the delay to wait before it, or `None`
    /// once the budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }
        let delay = self.config.backoff.delay(
            self.attempt,
            self.config.initial_delay,
            self.config.max_delay,
        );
        self.attempt += 1;
        Some(delay)
    }
}
