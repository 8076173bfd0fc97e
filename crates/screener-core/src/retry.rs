//! Retry policy for the idempotent GET feeds.
//!
//! Favorite mutations are never retried; a rejected toggle rolls back instead.

use std::time::Duration;

use crate::FeedError;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed { delay: Duration },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(seconds);
                if !jitter {
                    return delay;
                }

                let millis = delay.as_millis() as u64;
                let spread = millis / 2;
                let offset = fastrand::u64(0..=spread * 2);
                Duration::from_millis((millis + offset).saturating_sub(spread))
            }
        }
    }
}

/// How often and how patiently a feed fetch is repeated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    pub fn none() -> Self {
        Self::new(0)
    }

    /// Whether a failure on attempt `attempt` (0-based) earns another try.
    pub fn should_retry(&self, error: &FeedError, attempt: u32) -> bool {
        error.retryable() && attempt < self.max_retries
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
