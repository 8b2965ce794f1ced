//! Stale-while-revalidate coordinator
//!
//! Owns the key → entry table and decides, per lookup, whether to serve from
//! memory, serve and trigger a background refresh, or wait on a fetch.
//!
//! Lock discipline: the table sits behind a `RwLock`. Hits read under the
//! shared lock; creating, refreshing and evicting entries take the exclusive
//! lock. No lock is ever held across an upstream call.

use crate::error::{FetchError, LookupError, Result};
use crate::fetcher::{Fetcher, RefreshObserver, TracingObserver};
use crate::types::{CacheConfig, CacheStats};
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Shortest period the sweeper will tick at
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Bounds required of cache keys
pub trait CacheKey: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

type FetchOutcome<V> = std::result::Result<Option<V>, FetchError>;
type MissFuture<V> = BoxFuture<'static, FetchOutcome<V>>;

struct CacheEntry<V> {
    item: Option<V>,
    last_refreshed_at: Instant,
    refresh_in_flight: bool,
}

impl<V> CacheEntry<V> {
    fn fresh(item: Option<V>) -> Self {
        Self {
            item,
            last_refreshed_at: Instant::now(),
            refresh_in_flight: false,
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    refresh_failures: AtomicU64,
    evictions: AtomicU64,
}

struct Inner<K, V> {
    fetcher: Arc<dyn Fetcher<K, V>>,
    observer: Arc<dyn RefreshObserver<K>>,
    config: CacheConfig,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    /// Misses currently waiting on the upstream, one shared fetch per key.
    /// Lock order: `pending_misses` before `entries`.
    pending_misses: Mutex<HashMap<K, WeakShared<MissFuture<V>>>>,
    counters: Counters,
}

/// Read-through cache in front of a slow upstream
///
/// Cloning is cheap and every clone shares the same table.
pub struct CacheCoordinator<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for CacheCoordinator<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> CacheCoordinator<K, V>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
{
    /// Create a coordinator that reports refresh failures through `tracing`
    pub fn new(fetcher: Arc<dyn Fetcher<K, V>>, config: CacheConfig) -> Self {
        Self::with_observer(fetcher, config, Arc::new(TracingObserver))
    }

    /// Create a coordinator with a custom refresh failure sink
    pub fn with_observer(
        fetcher: Arc<dyn Fetcher<K, V>>,
        config: CacheConfig,
        observer: Arc<dyn RefreshObserver<K>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                observer,
                config,
                entries: RwLock::new(HashMap::new()),
                pending_misses: Mutex::new(HashMap::new()),
                counters: Counters::default(),
            }),
        }
    }

    /// Look up the item for `key`
    ///
    /// A hit returns the cached value without waiting on the network, and
    /// schedules a background refresh when the entry has aged past the
    /// freshness window. A miss waits on the upstream; on failure no entry is
    /// created and [`LookupError::UpstreamUnavailable`] is returned.
    ///
    /// Dropping the returned future abandons a pending miss fetch. Background
    /// refreshes are unaffected.
    pub async fn lookup(&self, key: &K) -> Result<Option<V>> {
        let cached = {
            let entries = self.inner.entries.read().await;
            entries
                .get(key)
                .map(|entry| (entry.item.clone(), self.inner.needs_refresh(entry)))
        };

        match cached {
            Some((item, needs_refresh)) => {
                self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
                if needs_refresh {
                    self.trigger_refresh(key).await;
                }
                Ok(item)
            }
            None => {
                self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
                self.fetch_on_miss(key)
                    .await
                    .map_err(LookupError::UpstreamUnavailable)
            }
        }
    }

    /// Stamp the entry and hand the refresh to a background task.
    ///
    /// The stamp is taken before the fetch starts, so concurrent stale hits see
    /// a fresh entry and do not trigger again. A slow refresh therefore also
    /// suppresses new triggers for a full freshness window.
    async fn trigger_refresh(&self, key: &K) {
        {
            let mut entries = self.inner.entries.write().await;
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            // Another lookup may have won the race for the write lock
            if !self.inner.needs_refresh(entry) {
                return;
            }
            entry.last_refreshed_at = Instant::now();
            entry.refresh_in_flight = true;
        }

        self.inner.counters.refreshes.fetch_add(1, Ordering::Relaxed);
        debug!(key = ?key, "Scheduling background refresh");

        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        tokio::spawn(async move {
            inner.refresh(key).await;
        });
    }

    async fn fetch_on_miss(&self, key: &K) -> FetchOutcome<V> {
        let fetch = {
            let mut pending = self.inner.pending_misses.lock().await;

            // A miss that completed since our read may have filled the entry
            if let Some(entry) = self.inner.entries.read().await.get(key) {
                return Ok(entry.item.clone());
            }

            match pending.get(key).and_then(WeakShared::upgrade) {
                Some(fetch) => fetch,
                None => {
                    let fetch: Shared<MissFuture<V>> =
                        Inner::complete_miss(Arc::clone(&self.inner), key.clone())
                            .boxed()
                            .shared();
                    if let Some(weak) = fetch.downgrade() {
                        pending.insert(key.clone(), weak);
                    }
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Evict every entry idle for longer than the retention window
    ///
    /// Entries with a refresh in flight are kept. Returns the number of
    /// entries removed.
    pub async fn sweep(&self) -> usize {
        let retention = self.inner.config.idle_retention;

        let (evicted, remaining) = {
            let mut entries = self.inner.entries.write().await;
            let before = entries.len();
            entries.retain(|_, entry| {
                entry.refresh_in_flight || entry.last_refreshed_at.elapsed() <= retention
            });
            (before - entries.len(), entries.len())
        };

        // Drop markers whose waiters all went away
        self.inner
            .pending_misses
            .lock()
            .await
            .retain(|_, fetch| fetch.upgrade().is_some());

        self.inner
            .counters
            .evictions
            .fetch_add(evicted as u64, Ordering::Relaxed);

        if evicted > 0 {
            info!(evicted, remaining, "Evicted idle cache entries");
        } else {
            debug!(remaining, "Sweep found no idle cache entries");
        }

        evicted
    }

    /// Run [`sweep`](Self::sweep) every `sweep_interval` on a background task
    ///
    /// The task exits on its next tick once every handle to the coordinator has
    /// been dropped. Intervals shorter than [`MIN_SWEEP_INTERVAL`] are raised
    /// to it.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let weak: Weak<Inner<K, V>> = Arc::downgrade(&self.inner);
        let configured = self.inner.config.sweep_interval;
        let period = configured.max(MIN_SWEEP_INTERVAL);
        if period != configured {
            warn!(
                configured = ?configured,
                period = ?period,
                "Sweep interval too short, using minimum"
            );
        }

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let cache = CacheCoordinator { inner };
                cache.sweep().await;
            }

            debug!("Cache dropped, stopping sweeper");
        })
    }

    pub async fn stats(&self) -> CacheStats {
        let counters = &self.inner.counters;
        CacheStats {
            entries: self.len().await,
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            refreshes: counters.refreshes.load(Ordering::Relaxed),
            refresh_failures: counters.refresh_failures.load(Ordering::Relaxed),
            evictions: counters.evictions.load(Ordering::Relaxed),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    /// When the entry for `key` was last stamped, if it exists
    pub async fn last_refreshed_at(&self, key: &K) -> Option<Instant> {
        self.inner
            .entries
            .read()
            .await
            .get(key)
            .map(|entry| entry.last_refreshed_at)
    }
}

impl<K, V> Inner<K, V>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
{
    fn needs_refresh(&self, entry: &CacheEntry<V>) -> bool {
        !entry.refresh_in_flight
            && entry.last_refreshed_at.elapsed() > self.config.freshness_window
    }

    async fn fetch_with_timeout(&self, key: &K) -> FetchOutcome<V> {
        let timeout = self.config.fetch_timeout;
        match tokio::time::timeout(timeout, self.fetcher.fetch(key)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    }

    /// Body of a background refresh. The stamp was set at trigger time and is
    /// not touched here.
    async fn refresh(&self, key: K) {
        let outcome = self.fetch_with_timeout(&key).await;

        let error = {
            let mut entries = self.entries.write().await;
            match outcome {
                Ok(item) => {
                    // Present: sweep never evicts an entry with a refresh in flight
                    if let Some(entry) = entries.get_mut(&key) {
                        entry.item = item;
                        entry.refresh_in_flight = false;
                    }
                    None
                }
                Err(error) => {
                    if let Some(entry) = entries.get_mut(&key) {
                        entry.refresh_in_flight = false;
                    }
                    Some(error)
                }
            }
        };

        match error {
            Some(error) => {
                self.counters.refresh_failures.fetch_add(1, Ordering::Relaxed);
                self.observer.refresh_failed(&key, &error);
            }
            None => debug!(key = ?key, "Background refresh applied"),
        }
    }

    /// Body of a shared miss fetch. Stores the result on success and clears
    /// the pending marker either way.
    async fn complete_miss(inner: Arc<Self>, key: K) -> FetchOutcome<V> {
        let outcome = inner.fetch_with_timeout(&key).await;

        if let Ok(item) = &outcome {
            let mut entries = inner.entries.write().await;
            match entries.entry(key.clone()) {
                Entry::Occupied(mut occupied) => {
                    let entry = occupied.get_mut();
                    entry.item = item.clone();
                    entry.last_refreshed_at = Instant::now();
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(CacheEntry::fresh(item.clone()));
                }
            }
        }

        inner.pending_misses.lock().await.remove(&key);
        outcome
    }
}
