//! Webhook redelivery policy.
//!
//! Slack answers `429` and `5xx` under load. Those statuses and retryable
//! transport failures are tried again after a capped, growing pause; every
//! other failure is final.

use std::time::Duration;

use crate::http_client::HttpError;

/// Pause before a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same pause before every retry.
    Fixed {
        /// Pause length.
        delay: Duration,
    },
    /// `base * factor^retry`, never longer than `max`.
    Exponential {
        /// Pause before the first retry.
        base: Duration,
        /// Growth per retry.
        factor: u32,
        /// Upper bound before jitter.
        max: Duration,
        /// Draw the pause uniformly from 50% to 150% of the computed value.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(500),
            factor: 2,
            max: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Pause before retry number `retry` (0 = first retry).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let grown = base.saturating_mul(factor.saturating_pow(retry)).min(max);
                if jitter {
                    grown.mul_f64(0.5 + fastrand::f64())
                } else {
                    grown
                }
            }
        }
    }
}

/// How a failed webhook delivery is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt; `0` sends once.
    pub max_retries: u32,
    /// Pause between attempts.
    pub backoff: Backoff,
    /// Response statuses treated as transient.
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub fn should_retry_error(&self, error: &HttpError) -> bool {
        error.retryable()
    }

    /// Pause before the next attempt, or `None` when the failure is final.
    ///
    /// `retries_done` counts retries already made, not the first attempt.
    pub fn next_delay(&self, retries_done: u32, transient: bool) -> Option<Duration> {
        (transient && retries_done < self.max_retries).then(|| self.backoff.delay(retries_done))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_pause_grows_then_caps() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(250),
            factor: 3,
            max: Duration::from_secs(2),
            jitter: false,
        };

        let pauses: Vec<_> = (0..4).map(|retry| backoff.delay(retry)).collect();
        assert_eq!(
            pauses,
            [
                Duration::from_millis(250),
                Duration::from_millis(750),
                Duration::from_secs(2),
                Duration::from_secs(2),
            ]
        );
    }

    #[test]
    fn huge_retry_numbers_saturate_at_the_cap() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
            factor: 10,
            max: Duration::from_secs(5),
            jitter: false,
        };
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn jitter_keeps_pause_within_half_and_one_and_a_half() {
        let backoff = Backoff::default();
        for _ in 0..50 {
            let pause = backoff.delay(1);
            assert!(pause >= Duration::from_millis(500), "{pause:?}");
            assert!(pause <= Duration::from_millis(1_500), "{pause:?}");
        }
    }

    #[test]
    fn transient_failures_are_retried_until_budget_is_spent() {
        let config = RetryConfig::fixed(Duration::from_millis(10), 2);

        assert_eq!(config.next_delay(0, true), Some(Duration::from_millis(10)));
        assert_eq!(config.next_delay(1, true), Some(Duration::from_millis(10)));
        assert_eq!(config.next_delay(2, true), None);
        assert_eq!(config.next_delay(0, false), None);
    }

    #[test]
    fn throttling_server_errors_and_transport_errors_are_transient() {
        let config = RetryConfig::default();

        assert!(config.should_retry_status(429));
        assert!(config.should_retry_status(503));
        assert!(!config.should_retry_status(400));
        assert!(!config.should_retry_status(404));
        assert!(config.should_retry_error(&HttpError::new("timeout")));
        assert!(!config.should_retry_error(&HttpError::non_retryable("bad url")));
    }
}
