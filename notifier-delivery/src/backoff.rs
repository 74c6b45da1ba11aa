//! Exponential backoff between delivery attempts

use std::time::Duration;

/// A doubling delay sequence bounded by a ceiling.
///
/// The first call to [`Backoff::advance`] yields the starting delay, each
/// later call yields twice the previous one, and once the ceiling is reached
/// every call yields the ceiling.
///
/// The constructor does not validate its inputs; [`RetryPolicy`] guarantees
/// `0 < min <= max` before a backoff is ever built from it.
///
/// [`RetryPolicy`]: crate::RetryPolicy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    current: Duration,
    ceiling: Duration,
}

impl Backoff {
    #[must_use]
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self {
            current: min,
            ceiling: max,
        }
    }

    /// The delay the next call to [`Backoff::advance`] will return.
    #[must_use]
    pub const fn current(&self) -> Duration {
        self.current
    }

    #[must_use]
    pub const fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Return the delay to wait now and step to the next one.
    pub fn advance(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.ceiling);
        delay
    }
}

/// An endless stream of delays, one per retry.
impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.advance())
    }
}
