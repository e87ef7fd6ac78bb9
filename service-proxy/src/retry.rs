use crate::error::ProxyError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;

/// Statuses treated as permanent even though they are 5xx
const PERMANENT_SERVER_STATUSES: [u16; 2] = [501, 505];

/// Decides whether a failed attempt is retried and how long to wait first.
///
/// Delays grow exponentially from `base_delay_ms` and are capped at `max_delay_ms`.
/// There is no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Treat 429 as transient instead of as a plain client error
    pub retry_rate_limited: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            retry_rate_limited: false,
        }
    }
}

impl RetryPolicy {
    pub fn new(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
            ..Self::default()
        }
    }

    pub fn with_rate_limit_retries(mut self, enabled: bool) -> Self {
        self.retry_rate_limited = enabled;
        self
    }

    /// `attempt_number` is the 1-based number of the attempt that just failed.
    pub fn should_retry(&self, error: &ProxyError, attempt_number: u32, max_retries: u32) -> bool {
        if attempt_number > max_retries {
            return false;
        }

        if let Some(status) = error.status {
            if PERMANENT_SERVER_STATUSES.contains(&status) {
                return false;
            }
            if (400..500).contains(&status) {
                return self.retry_rate_limited && status == 429;
            }
        }

        !error.is_client_error()
    }

    /// Wait before the attempt following `attempt_number`: `base * 2^(n-1)`, capped.
    pub fn delay_for_attempt(&self, attempt_number: u32) -> Duration {
        let exponent = attempt_number.saturating_sub(1).min(63);
        let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}
