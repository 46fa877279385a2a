//! Memoizing wrappers with a fixed time-to-live
//!
//! A wrapper binds one computation to one entry store. Lookups serve a
//! stored value while it is strictly younger than the TTL; a miss invokes
//! the computation exactly once and stores the result on success only.
//! Failures pass through with their own error type and are never cached.
//! Stale entries are not purged; the next successful call for the same key
//! overwrites them in place.
//!
//! No lock is held across the wrapped computation, so two concurrent
//! misses for the same key may both compute and the later write wins. That
//! duplication is an accepted policy; the stored state stays coherent.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;
use super::error::MemoError;
use super::key::{CallKey, MemoArgs};
use super::store::{EntryStore, UnboundedStore};

/// Point-in-time counters for one wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoStats {
    /// Lookups served from the store.
    pub hits: u64,
    /// Lookups that required (or attempted) a computation, including
    /// lookups that found only a stale entry.
    pub misses: u64,
    /// Entries currently stored, fresh and stale alike.
    pub entries: usize,
}

impl MemoStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        if self.lookups() == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups() as f64
        }
    }
}

/// Shared state of a wrapper: store, TTL, clock and counters.
struct MemoCore<V> {
    name: String,
    ttl: Duration,
    store: Box<dyn EntryStore<V>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> MemoCore<V> {
    /// Returns the stored value for `key` if one exists and is still
    /// fresh. Stale entries are counted as misses and left in place.
    fn lookup(&self, key: &CallKey) -> Option<V> {
        let now = self.clock.now();

        match self.store.load(key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                self.hits.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(name = %self.name, key = %key, "Cache hit");
                Some(entry.into_value())
            }
            Some(entry) => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(
                    name = %self.name,
                    key = %key,
                    age_secs = entry.age(now).as_secs(),
                    "Cache entry expired, recomputing"
                );
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(name = %self.name, key = %key, "Cache miss, computing");
                None
            }
        }
    }

    fn record(&self, key: CallKey, value: V) {
        self.store.save(key, CacheEntry::new(self.clock.now(), value));
    }

    fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
            entries: self.store.len(),
        }
    }
}

impl<V> fmt::Debug for MemoCore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCore")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Memoized`] and [`AsyncMemoized`].
///
/// The TTL is validated once, when the wrapper is built: a zero TTL is
/// rejected with [`MemoError::InvalidTtl`] (negative durations are not
/// representable). Each built wrapper gets its own store; stores are never
/// shared between wrappers.
pub struct MemoBuilder<V> {
    ttl: Duration,
    name: String,
    store: Option<Box<dyn EntryStore<V>>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<V: Clone + Send + 'static> MemoBuilder<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            name: "memo".to_string(),
            store: None,
            clock: None,
        }
    }

    /// Sets the name used in log events and metrics labels.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the default unbounded store.
    pub fn with_store(mut self, store: Box<dyn EntryStore<V>>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the system clock, mainly for deterministic tests.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Builds a wrapper around a synchronous computation.
    pub fn build<A, E, F>(self, compute: F) -> Result<Memoized<A, V, E, F>, MemoError>
    where
        A: MemoArgs,
        F: Fn(&A) -> Result<V, E>,
    {
        Ok(Memoized {
            core: self.into_core()?,
            compute,
            _marker: PhantomData,
        })
    }

    /// Builds a wrapper around an asynchronous computation.
    pub fn build_async<A, E, F, Fut>(
        self,
        compute: F,
    ) -> Result<AsyncMemoized<A, V, E, F>, MemoError>
    where
        A: MemoArgs,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        Ok(AsyncMemoized {
            core: self.into_core()?,
            compute,
            _marker: PhantomData,
        })
    }

    fn into_core(self) -> Result<MemoCore<V>, MemoError> {
        if self.ttl.is_zero() {
            return Err(MemoError::invalid_ttl("ttl must be greater than zero"));
        }

        Ok(MemoCore {
            name: self.name,
            ttl: self.ttl,
            store: self
                .store
                .unwrap_or_else(|| Box::new(UnboundedStore::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }
}

/// A synchronous computation wrapped with an expiring memoization cache.
///
/// `call` derives a structural key from the arguments, serves a fresh
/// stored value if one exists, and otherwise invokes the computation
/// exactly once. Results are cached on success only; errors pass through
/// unchanged. Values are returned by clone, so expensive-to-clone results
/// are best wrapped in `Arc` by the computation itself.
pub struct Memoized<A, V, E, F> {
    compute: F,
    core: MemoCore<V>,
    _marker: PhantomData<fn(&A) -> Result<V, E>>,
}

impl<A, V, E, F> Memoized<A, V, E, F>
where
    A: MemoArgs,
    V: Clone + Send + 'static,
    F: Fn(&A) -> Result<V, E>,
{
    /// Wraps `compute` with a fresh cache and the given TTL.
    pub fn new(ttl: Duration, compute: F) -> Result<Self, MemoError> {
        MemoBuilder::new(ttl).build(compute)
    }

    /// Looks up the arguments and either serves the stored value or
    /// invokes the computation once, storing its result on success.
    pub fn call(&self, args: &A) -> Result<V, E> {
        let key = args.call_key();

        if let Some(value) = self.core.lookup(&key) {
            return Ok(value);
        }

        let value = (self.compute)(args)?;
        self.core.record(key, value.clone());
        Ok(value)
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn ttl(&self) -> Duration {
        self.core.ttl
    }

    /// Entries currently stored, fresh and stale alike.
    pub fn len(&self) -> usize {
        self.core.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.store.is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        self.core.stats()
    }

    /// Drops the entry for `args`, forcing the next call to recompute.
    /// Returns whether an entry was present.
    pub fn invalidate(&self, args: &A) -> bool {
        self.core.store.remove(&args.call_key())
    }

    pub fn clear(&self) {
        self.core.store.clear();
    }
}

impl<A, V, E, F> fmt::Debug for Memoized<A, V, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

/// An asynchronous computation wrapped with an expiring memoization cache.
///
/// Same semantics as [`Memoized`]; the computation is awaited without any
/// store lock held, so concurrent misses for one key may compute twice.
pub struct AsyncMemoized<A, V, E, F> {
    compute: F,
    core: MemoCore<V>,
    _marker: PhantomData<fn(A) -> Result<V, E>>,
}

impl<A, V, E, F> AsyncMemoized<A, V, E, F>
where
    A: MemoArgs,
    V: Clone + Send + 'static,
{
    /// Looks up the arguments and either serves the stored value or awaits
    /// the computation once, storing its result on success.
    pub async fn call<Fut>(&self, args: A) -> Result<V, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = args.call_key();

        if let Some(value) = self.core.lookup(&key) {
            return Ok(value);
        }

        let value = (self.compute)(args).await?;
        self.core.record(key, value.clone());
        Ok(value)
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn ttl(&self) -> Duration {
        self.core.ttl
    }

    pub fn len(&self) -> usize {
        self.core.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.store.is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        self.core.stats()
    }

    pub fn invalidate(&self, args: &A) -> bool {
        self.core.store.remove(&args.call_key())
    }

    pub fn clear(&self) {
        self.core.store.clear();
    }
}

impl<A, V, E, F> fmt::Debug for AsyncMemoized<A, V, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMemoized")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;

    /// A counting square computation failing on negative input.
    fn counting_square(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(&i64) -> Result<i64, &'static str> {
        move |n: &i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            if *n < 0 {
                Err("negative input")
            } else {
                Ok(n * n)
            }
        }
    }

    fn memoized_square(
        ttl: Duration,
        clock: ManualClock,
    ) -> (
        Memoized<i64, i64, &'static str, impl Fn(&i64) -> Result<i64, &'static str>>,
        Arc<AtomicUsize>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = MemoBuilder::new(ttl)
            .with_name("square")
            .with_clock(clock)
            .build(counting_square(calls.clone()))
            .unwrap();
        (memo, calls)
    }

    #[test]
    fn test_first_call_is_a_miss_and_computes_once() {
        let (memo, calls) = memoized_square(Duration::from_secs(60), ManualClock::new());

        assert_eq!(memo.call(&4), Ok(16));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_second_call_within_ttl_is_a_hit() {
        let clock = ManualClock::new();
        let (memo, calls) = memoized_square(Duration::from_secs(60), clock.clone());

        assert_eq!(memo.call(&4), Ok(16));
        clock.advance(Duration::from_secs(30));
        assert_eq!(memo.call(&4), Ok(16));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_call_after_ttl_recomputes_once() {
        // ttl = 60s: miss at t=0, hit at t=30, recompute at t=61
        let clock = ManualClock::new();
        let (memo, calls) = memoized_square(Duration::from_secs(60), clock.clone());

        assert_eq!(memo.call(&4), Ok(16));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(30));
        assert_eq!(memo.call(&4), Ok(16));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(31));
        assert_eq!(memo.call(&4), Ok(16));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_entry_exactly_ttl_old_is_stale() {
        let clock = ManualClock::new();
        let (memo, calls) = memoized_square(Duration::from_secs(60), clock.clone());

        memo.call(&4).unwrap();
        clock.advance(Duration::from_secs(60));
        memo.call(&4).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_refresh_restarts_the_ttl_window() {
        let clock = ManualClock::new();
        let (memo, calls) = memoized_square(Duration::from_secs(60), clock.clone());

        memo.call(&4).unwrap();
        clock.advance(Duration::from_secs(61));
        memo.call(&4).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The refreshed entry is fresh again for a full window
        clock.advance(Duration::from_secs(59));
        memo.call(&4).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_distinct_arguments_compute_separately() {
        let (memo, calls) = memoized_square(Duration::from_secs(60), ManualClock::new());

        assert_eq!(memo.call(&2), Ok(4));
        assert_eq!(memo.call(&3), Ok(9));
        assert_eq!(memo.call(&2), Ok(4));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn test_named_argument_order_does_not_affect_caching() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let memo: Memoized<CallKey, i64, &'static str, _> =
            MemoBuilder::new(Duration::from_secs(60))
                .with_clock(ManualClock::new())
                .build(move |_key: &CallKey| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .unwrap();

        let first = CallKey::new().named("width", 3).named("height", 4);
        let second = CallKey::new().named("height", 4).named("width", 3);

        assert_eq!(memo.call(&first), Ok(42));
        assert_eq!(memo.call(&second), Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_propagate_unchanged_and_are_never_cached() {
        // ttl = 1s, computation failing for -1: every call is a fresh miss
        let clock = ManualClock::new();
        let (memo, calls) = memoized_square(Duration::from_secs(1), clock.clone());

        assert_eq!(memo.call(&-1), Err("negative input"));
        assert_eq!(memo.call(&-1), Err("negative input"));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(memo.is_empty());
    }

    #[test]
    fn test_failures_do_not_disturb_cached_successes() {
        let clock = ManualClock::new();
        let (memo, calls) = memoized_square(Duration::from_secs(60), clock.clone());

        assert_eq!(memo.call(&4), Ok(16));
        assert_eq!(memo.call(&-1), Err("negative input"));
        assert_eq!(memo.call(&4), Ok(16));

        // One success computed once, one failure computed once
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_rejected_at_construction() {
        let result = Memoized::<i64, i64, &'static str, _>::new(Duration::ZERO, |n: &i64| {
            Ok(n * n)
        });

        assert!(matches!(result, Err(MemoError::InvalidTtl { .. })));
    }

    #[test]
    fn test_stale_entries_are_overwritten_not_purged() {
        let clock = ManualClock::new();
        let (memo, _calls) = memoized_square(Duration::from_secs(60), clock.clone());

        memo.call(&4).unwrap();
        clock.advance(Duration::from_secs(3600));

        // Stale, but still present
        assert_eq!(memo.len(), 1);

        // The recompute overwrites in place
        memo.call(&4).unwrap();
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_invalidate_forces_a_recompute() {
        let (memo, calls) = memoized_square(Duration::from_secs(60), ManualClock::new());

        memo.call(&4).unwrap();
        assert!(memo.invalidate(&4));
        assert!(!memo.invalidate(&4));

        memo.call(&4).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear_empties_the_store() {
        let (memo, _calls) = memoized_square(Duration::from_secs(60), ManualClock::new());

        memo.call(&2).unwrap();
        memo.call(&3).unwrap();
        memo.clear();

        assert!(memo.is_empty());
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let clock = ManualClock::new();
        let (memo, _calls) = memoized_square(Duration::from_secs(60), clock.clone());

        memo.call(&4).unwrap();
        memo.call(&4).unwrap();
        memo.call(&4).unwrap();

        let stats = memo.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.lookups(), 3);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_carries_name_and_ttl() {
        let memo: Memoized<i64, i64, &'static str, _> =
            MemoBuilder::new(Duration::from_secs(5))
                .with_name("squares")
                .build(|n: &i64| Ok(n * n))
                .unwrap();

        assert_eq!(memo.name(), "squares");
        assert_eq!(memo.ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_concurrent_misses_both_compute_and_converge() {
        // Neither thread can hit: the first to miss blocks inside the
        // computation until the second has also missed, so both compute
        // and the later write wins with an identical value.
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(2));

        let counter = calls.clone();
        let gate = barrier.clone();
        let memo: Memoized<i64, i64, &'static str, _> =
            MemoBuilder::new(Duration::from_secs(60))
                .with_clock(ManualClock::new())
                .build(move |n: &i64| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    gate.wait();
                    Ok(n * n)
                })
                .unwrap();

        std::thread::scope(|scope| {
            let first = scope.spawn(|| memo.call(&4));
            let second = scope.spawn(|| memo.call(&4));
            assert_eq!(first.join().unwrap(), Ok(16));
            assert_eq!(second.join().unwrap(), Ok(16));
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.stats().misses, 2);
    }

    #[tokio::test]
    async fn test_async_memoized_caches_results() {
        let clock = ManualClock::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let memo: AsyncMemoized<i64, i64, &'static str, _> =
            MemoBuilder::new(Duration::from_secs(60))
                .with_name("async-square")
                .with_clock(clock.clone())
                .build_async(move |n: i64| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(n * n)
                    }
                })
                .unwrap();

        assert_eq!(memo.call(4).await, Ok(16));
        assert_eq!(memo.call(4).await, Ok(16));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(61));
        assert_eq!(memo.call(4).await, Ok(16));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_async_failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let memo: AsyncMemoized<i64, i64, &'static str, _> =
            MemoBuilder::new(Duration::from_secs(60))
                .with_clock(ManualClock::new())
                .build_async(move |n: i64| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        if n < 0 { Err("negative input") } else { Ok(n * n) }
                    }
                })
                .unwrap();

        assert_eq!(memo.call(-1).await, Err("negative input"));
        assert_eq!(memo.call(-1).await, Err("negative input"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(memo.is_empty());
    }
}
