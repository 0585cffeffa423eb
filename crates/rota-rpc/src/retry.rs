//! Retry policy for a single logical call.

use std::time::Duration;

use backoff::ExponentialBackoff;

/// How many times a call is retried and how long to wait in between.
///
/// The delay doubles after every retry. A policy is configured per call and
/// never shared between concurrent retry loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero means exactly one attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Factor applied to the delay after every retry.
    pub const BACKOFF_MULTIPLIER: u32 = 2;

    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// A single attempt with no backoff.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
        }
    }

    /// Total attempts a permanently failing call makes.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry `retry` (1-indexed): `initial_delay × 2^(retry-1)`.
    ///
    /// Retry 0 is the first attempt, which never waits.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = Self::BACKOFF_MULTIPLIER.saturating_pow(retry - 1);
        self.initial_delay.saturating_mul(factor)
    }

    /// The full schedule of waits a permanently failing call goes through.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.max_retries).map(|retry| self.delay_before_retry(retry))
    }

    /// Jitter-free exponential backoff matching [`RetryPolicy::delay_before_retry`].
    pub(crate) fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            randomization_factor: 0.0,
            multiplier: f64::from(Self::BACKOFF_MULTIPLIER),
            max_interval: Duration::MAX,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}
