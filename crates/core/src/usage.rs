//! Free-tier usage gate.
//!
//! The counter itself lives outside this crate (browser storage, a table,
//! a file); callers inject it through [`UsageCounter`]. The gate counts
//! every attempt, including rejected ones.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::CoreError;

/// Generations an anonymous user may attempt before signing in.
pub const FREE_GENERATION_LIMIT: u64 = 10;

/// Persistent attempt counter. Starts at zero when never written.
pub trait UsageCounter: Send + Sync {
    fn get(&self) -> Result<u64, CoreError>;

    /// Increment and return the new value.
    fn increment(&self) -> Result<u64, CoreError>;
}

/// Process-local counter, mainly for tests and single-run tools.
#[derive(Debug, Default)]
pub struct InMemoryUsageCounter {
    count: AtomicU64,
}

impl InMemoryUsageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(count: u64) -> Self {
        Self {
            count: AtomicU64::new(count),
        }
    }
}

impl UsageCounter for InMemoryUsageCounter {
    fn get(&self) -> Result<u64, CoreError> {
        Ok(self.count.load(Ordering::SeqCst))
    }

    fn increment(&self) -> Result<u64, CoreError> {
        Ok(self.count.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Decides whether a generation attempt may proceed.
pub struct UsageGate<C> {
    counter: C,
    limit: u64,
}

impl<C: UsageCounter> UsageGate<C> {
    pub fn new(counter: C) -> Self {
        Self::with_limit(counter, FREE_GENERATION_LIMIT)
    }

    pub fn with_limit(counter: C, limit: u64) -> Self {
        Self { counter, limit }
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// Record an attempt and decide whether it may proceed.
    ///
    /// The attempt is counted before the decision. Anonymous callers are
    /// rejected once the count prior to this attempt reaches `limit - 1`;
    /// signed-in callers always pass. Returns the updated count.
    pub fn admit(&self, signed_in: bool) -> Result<u64, CoreError> {
        let previous = self.counter.get()?;
        let updated = self.counter.increment()?;

        if !signed_in && previous >= self.limit.saturating_sub(1) {
            return Err(CoreError::UsageLimitReached { limit: self.limit });
        }
        Ok(updated)
    }
}
