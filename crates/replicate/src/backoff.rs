//! Retry policy for status queries that fail in transport.
//!
//! A policy with `max_retries == 0` (the default) yields no delays, so a
//! failed status query aborts the poll loop immediately.

use std::time::Duration;

/// How often, and after which pauses, a failed status query is re-sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries allowed per status query.
    pub max_retries: u32,
    /// Pause before the first retry.
    pub initial_delay: Duration,
    /// Ceiling for any single pause.
    pub max_delay: Duration,
    /// Growth factor applied to the pause after each retry.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// The pauses to take before each retry of one status query, in order.
    /// Yields exactly `max_retries` items, each clamped to `max_delay`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        let first = self.initial_delay.min(self.max_delay);
        std::iter::successors(Some(first), move |prev| Some(self.grow(*prev)))
            .take(self.max_retries as usize)
    }

    fn grow(&self, prev: Duration) -> Duration {
        let grown = prev.as_secs_f64() * self.multiplier.max(1.0);
        Duration::try_from_secs_f64(grown)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}
