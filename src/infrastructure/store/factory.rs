//! Store factory for runtime selection

use crate::config::CacheSettings;
use crate::domain::{EntryStore, MemoError, UnboundedStore};

use super::bounded::BoundedStore;

/// Supported entry-store kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Mutex-guarded hash map, no capacity bound (the default)
    Unbounded,
    /// moka-backed store with a maximum resident capacity
    Bounded,
}

impl Default for StoreKind {
    fn default() -> Self {
        Self::Unbounded
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Unbounded => write!(f, "unbounded"),
            StoreKind::Bounded => write!(f, "bounded"),
        }
    }
}

impl std::str::FromStr for StoreKind {
    type Err = MemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unbounded" | "unlimited" => Ok(StoreKind::Unbounded),
            "bounded" | "capped" => Ok(StoreKind::Bounded),
            _ => Err(MemoError::configuration(format!(
                "Unknown store kind: {}. Valid kinds: unbounded, bounded",
                s
            ))),
        }
    }
}

/// Factory for creating entry stores from settings
#[derive(Debug, Default)]
pub struct StoreFactory;

impl StoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates an entry store matching the configured kind. Selecting the
    /// bounded store without a capacity is a configuration error.
    pub fn create<V>(&self, settings: &CacheSettings) -> Result<Box<dyn EntryStore<V>>, MemoError>
    where
        V: Clone + Send + Sync + 'static,
    {
        match settings.store.parse()? {
            StoreKind::Unbounded => Ok(Box::new(UnboundedStore::new())),
            StoreKind::Bounded => {
                let capacity = settings.capacity.ok_or_else(|| {
                    MemoError::configuration("capacity is required for the bounded store")
                })?;

                Ok(Box::new(BoundedStore::new(capacity)))
            }
        }
    }
}
