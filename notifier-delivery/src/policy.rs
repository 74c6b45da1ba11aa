//! Retry policy for delivery operations.
//!
//! Holds the bounds of the backoff used between attempts. Bounds supplied by
//! configuration are never rejected; they are normalized into a usable range
//! once, when the policy is built.

use std::time::Duration;

use tracing::warn;

use crate::backoff::Backoff;

/// Used when the configured minimum delay is zero.
pub const DEFAULT_MIN_RETRY_DELAY: Duration = Duration::from_secs(15);

/// Used when the configured maximum delay is zero.
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(15 * 60);

/// Bounds for the delay between delivery attempts.
///
/// Always satisfies `0 < min_delay <= max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_MIN_RETRY_DELAY,
            max_delay: DEFAULT_MAX_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Build a policy from possibly invalid bounds, logging a warning when
    /// they had to be adjusted.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let policy = Self::normalize(min_delay, max_delay);

        if policy.min_delay != min_delay || policy.max_delay != max_delay {
            warn!(
                requested_min = ?min_delay,
                requested_max = ?max_delay,
                min_delay = ?policy.min_delay,
                max_delay = ?policy.max_delay,
                "Retry delays adjusted"
            );
        }

        policy
    }

    /// Normalize the bounds without logging.
    ///
    /// 1. An inverted pair raises the maximum to the minimum.
    /// 2. A zero minimum becomes [`DEFAULT_MIN_RETRY_DELAY`].
    /// 3. A zero maximum becomes [`DEFAULT_MAX_RETRY_DELAY`].
    ///
    /// A zero minimum paired with a maximum below the default minimum would
    /// come out inverted, so the first rule is applied again at the end.
    #[must_use]
    pub fn normalize(mut min_delay: Duration, mut max_delay: Duration) -> Self {
        if min_delay > max_delay {
            max_delay = min_delay;
        }
        if min_delay.is_zero() {
            min_delay = DEFAULT_MIN_RETRY_DELAY;
        }
        if max_delay.is_zero() {
            max_delay = DEFAULT_MAX_RETRY_DELAY;
        }
        if min_delay > max_delay {
            max_delay = min_delay;
        }

        Self {
            min_delay,
            max_delay,
        }
    }

    #[must_use]
    pub const fn min_delay(&self) -> Duration {
        self.min_delay
    }

    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// A fresh backoff for one delivery sequence.
    #[must_use]
    pub const fn backoff(&self) -> Backoff {
        Backoff::new(self.min_delay, self.max_delay)
    }
}
