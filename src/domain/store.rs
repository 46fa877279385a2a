//! Entry-store seam and the default unbounded store

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use super::entry::CacheEntry;
use super::key::CallKey;

/// Storage seam for memoized entries.
///
/// Implementations hold at most one entry per key and never interpret the
/// entries they hold: freshness is decided by the memoizer, the store only
/// keeps whatever was last saved. All methods are synchronous; the
/// memoizer acquires no lock across a wrapped computation.
pub trait EntryStore<V>: Send + Sync + fmt::Debug {
    /// Returns the stored entry for `key`, fresh or stale.
    fn load(&self, key: &CallKey) -> Option<CacheEntry<V>>;

    /// Stores `entry` under `key`, replacing any previous entry.
    fn save(&self, key: CallKey, entry: CacheEntry<V>);

    /// Removes the entry for `key`. Returns whether one was present.
    fn remove(&self, key: &CallKey) -> bool;

    /// Removes every entry.
    fn clear(&self);

    /// Number of stored entries, fresh and stale alike.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The default store: a mutex-guarded hash map.
///
/// No capacity bound and no eviction. Stale entries are kept until the
/// next successful call for the same key overwrites them, so `len` counts
/// every key ever stored.
pub struct UnboundedStore<V> {
    entries: Mutex<HashMap<CallKey, CacheEntry<V>>>,
}

impl<V> UnboundedStore<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> Default for UnboundedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for UnboundedStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnboundedStore")
            .field("entries", &self.entries.lock().unwrap().len())
            .finish()
    }
}

impl<V: Clone + Send> EntryStore<V> for UnboundedStore<V> {
    fn load(&self, key: &CallKey) -> Option<CacheEntry<V>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn save(&self, key: CallKey, entry: CacheEntry<V>) {
        self.entries.lock().unwrap().insert(key, entry);
    }

    fn remove(&self, key: &CallKey) -> bool {
        self.entries.lock().unwrap().remove(key).is_some()
    }

    fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
