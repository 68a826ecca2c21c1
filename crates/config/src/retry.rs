#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

/// Backoff applied to object store listing calls.
#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Retry {
    /// Total attempts per page, including the first one.
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde_as(as = "serde_with::DurationMilliSeconds")]
    pub initial_backoff: Duration,

    pub backoff_multiplier: f64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
        }
    }
}

impl Retry {
    /// Delay to wait after the given failed attempt (1-based).
    ///
    /// ```
    /// # use config::Retry;
    /// # use std::time::Duration;
    /// let retry = Retry::default();
    /// assert_eq!(retry.backoff_for(1), Duration::from_secs(1));
    /// assert_eq!(retry.backoff_for(3), Duration::from_secs(4));
    /// ```
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.initial_backoff
            .mul_f64(self.backoff_multiplier.max(1.0).powi(exponent).min(1e6))
    }
}
