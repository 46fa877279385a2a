//! Cached entry: a stored value and the instant it was written

use std::time::{Duration, Instant};

/// One memoized result together with the instant it was stored or last
/// refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    stored_at: Instant,
    value: V,
}

impl<V> CacheEntry<V> {
    pub fn new(stored_at: Instant, value: V) -> Self {
        Self { stored_at, value }
    }

    pub fn stored_at(&self) -> Instant {
        self.stored_at
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    /// Time elapsed since the entry was stored, as seen from `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    /// An entry is fresh while strictly younger than the TTL; an entry
    /// exactly `ttl` old is already stale.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}
