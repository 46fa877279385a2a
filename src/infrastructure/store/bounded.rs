//! Capacity-bounded entry store backed by moka
//!
//! Opt-in alternative to the default unbounded store for workloads with
//! many distinct keys. moka only bounds residency: freshness is still
//! decided by the memoizer from each entry's stored instant, and an entry
//! evicted under capacity pressure simply makes the next call a miss.

use std::fmt;

use moka::sync::Cache;

use crate::domain::{CacheEntry, CallKey, EntryStore};

pub struct BoundedStore<V> {
    cache: Cache<CallKey, CacheEntry<V>>,
    capacity: u64,
}

impl<V> BoundedStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(capacity).build();

        Self { cache, capacity }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

impl<V> fmt::Debug for BoundedStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedStore")
            .field("capacity", &self.capacity)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl<V> EntryStore<V> for BoundedStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn load(&self, key: &CallKey) -> Option<CacheEntry<V>> {
        self.cache.get(key)
    }

    fn save(&self, key: CallKey, entry: CacheEntry<V>) {
        self.cache.insert(key, entry);
    }

    fn remove(&self, key: &CallKey) -> bool {
        self.cache.remove(key).is_some()
    }

    fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate until moka's pending housekeeping has run.
    fn len(&self) -> usize {
        self.cache.entry_count() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Clock, ManualClock};
    use std::time::Duration;

    fn key(n: i64) -> CallKey {
        CallKey::new().arg(n)
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let clock = ManualClock::new();
        let store = BoundedStore::new(100);

        store.save(key(4), CacheEntry::new(clock.now(), 16));

        let entry = store.load(&key(4)).unwrap();
        assert_eq!(*entry.value(), 16);
        assert_eq!(entry.stored_at(), clock.now());
    }

    #[test]
    fn test_save_overwrites_prior_entry() {
        let clock = ManualClock::new();
        let store = BoundedStore::new(100);

        store.save(key(4), CacheEntry::new(clock.now(), 16));
        clock.advance(Duration::from_secs(120));
        store.save(key(4), CacheEntry::new(clock.now(), 17));

        let entry = store.load(&key(4)).unwrap();
        assert_eq!(*entry.value(), 17);
        assert_eq!(entry.stored_at(), clock.now());
    }

    #[test]
    fn test_freshness_still_comes_from_the_entry() {
        let clock = ManualClock::new();
        let store = BoundedStore::new(100);
        let ttl = Duration::from_secs(60);

        store.save(key(4), CacheEntry::new(clock.now(), 16));
        clock.advance(Duration::from_secs(61));

        // The store keeps the entry; only the memoizer treats it as stale
        let entry = store.load(&key(4)).unwrap();
        assert!(!entry.is_fresh(clock.now(), ttl));
    }

    #[test]
    fn test_capacity_bounds_resident_entries() {
        let clock = ManualClock::new();
        let store = BoundedStore::new(10);

        for n in 0..100 {
            store.save(key(n), CacheEntry::new(clock.now(), n * n));
        }
        store.cache.run_pending_tasks();

        assert!(store.len() <= 10);
        assert_eq!(store.capacity(), 10);
    }

    #[test]
    fn test_remove_and_clear() {
        let clock = ManualClock::new();
        let store = BoundedStore::new(100);

        store.save(key(1), CacheEntry::new(clock.now(), 1));
        store.save(key(2), CacheEntry::new(clock.now(), 4));

        assert!(store.remove(&key(1)));
        assert!(!store.remove(&key(1)));

        store.clear();
        store.cache.run_pending_tasks();
        assert!(store.is_empty());
    }

    #[test]
    fn test_usable_as_trait_object() {
        let clock = ManualClock::new();
        let store: Box<dyn EntryStore<i64>> = Box::new(BoundedStore::new(100));

        store.save(key(4), CacheEntry::new(clock.now(), 16));
        assert_eq!(store.load(&key(4)).map(CacheEntry::into_value), Some(16));
    }
}
