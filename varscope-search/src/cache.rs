//! Single-flight, TTL-bounded caching of entity-scoped query results.
//!
//! [`SingleFlightCache`] sits in front of a [`CacheStore`]. On a miss it
//! registers one shared computation per key; concurrent callers for the
//! same key attach to that computation instead of starting their own.
//! Successful results are written to the store with the caller's TTL;
//! failures are handed to every attached caller and never stored.
//!
//! [`MemoryStore`] is the in-process store, built on [`moka`] with
//! per-entry expiry and an injectable [`Clock`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use moka::future::Cache;
use moka::Expiry;

use crate::clock::Clock;
use crate::error::SearchError;

/// Deterministic key for an entity-scoped result set.
///
/// Pure: depends only on its arguments, never on call site or order.
pub fn cache_key(dataset_id: &str, entity_kind: &str, entity_id: &str) -> String {
    format!("{dataset_id}:{entity_kind}:{entity_id}")
}

/// An external key-value store with per-entry expiry.
pub trait CacheStore<V>: Send + Sync {
    /// The live value for `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Option<V>> + Send;

    /// Store `value` under `key` for `ttl`.
    fn set(&self, key: String, value: V, ttl: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone)]
struct StoredEntry<V> {
    value: V,
    expires_at: Instant,
    ttl: Duration,
}

/// Evicts each entry once its own TTL has elapsed.
struct EntryExpiry;

impl<V> Expiry<String, StoredEntry<V>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredEntry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-memory [`CacheStore`].
///
/// Freshness is judged against the injected clock: an entry is served
/// while `now < expires_at` and dropped at or after `expires_at`.
pub struct MemoryStore<V> {
    entries: Cache<String, StoredEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .expire_after(EntryExpiry)
                .build(),
            clock,
        }
    }
}

impl<V> CacheStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key).await?;
        if self.clock.now() >= entry.expires_at {
            self.entries.invalidate(key).await;
            return None;
        }
        Some(entry.value)
    }

    async fn set(&self, key: String, value: V, ttl: Duration) {
        let entry = StoredEntry {
            value,
            expires_at: self.clock.now() + ttl,
            ttl,
        };
        self.entries.insert(key, entry).await;
    }
}

type Flight<V> = Shared<BoxFuture<'static, Result<V, SearchError>>>;
type Registry<V> = Arc<Mutex<HashMap<String, Flight<V>>>>;

/// Memoizes expensive computations with at most one in flight per key.
pub struct SingleFlightCache<V, S> {
    store: Arc<S>,
    in_flight: Registry<V>,
}

impl<V, S> SingleFlightCache<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: CacheStore<V> + 'static,
{
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of keys with a computation currently registered.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Return the cached value for `key`, computing it with `compute` on
    /// a miss.
    ///
    /// If a computation for `key` is already running, this call attaches
    /// to it and `compute` is not invoked.
    ///
    /// # Errors
    ///
    /// Returns the computation's error. The error is delivered to every
    /// caller attached to the same computation and is not cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: String,
        ttl: Duration,
        compute: F,
    ) -> Result<V, SearchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, SearchError>> + Send + 'static,
    {
        if let Some(value) = self.store.get(&key).await {
            tracing::debug!(key = %key, "cache hit");
            return Ok(value);
        }

        let flight = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(&key) {
                Some(existing) => {
                    tracing::debug!(key = %key, "joining in-flight computation");
                    existing.clone()
                }
                None => {
                    tracing::debug!(key = %key, "cache miss, computing");
                    let flight = run_flight(
                        key.clone(),
                        ttl,
                        compute(),
                        Arc::clone(&self.store),
                        Arc::clone(&self.in_flight),
                    )
                    .boxed()
                    .shared();
                    in_flight.insert(key, flight.clone());
                    flight
                }
            }
        };

        flight.await
    }
}

/// Body of one registered computation.
///
/// Re-checks the store first: a previous flight for the same key may have
/// stored its value between this caller's miss and its registration. The
/// value is stored before the registry entry is removed, so no caller can
/// observe neither.
async fn run_flight<V, S, Fut>(
    key: String,
    ttl: Duration,
    compute: Fut,
    store: Arc<S>,
    registry: Registry<V>,
) -> Result<V, SearchError>
where
    V: Clone + Send + Sync + 'static,
    S: CacheStore<V> + 'static,
    Fut: Future<Output = Result<V, SearchError>> + Send + 'static,
{
    let result = match store.get(&key).await {
        Some(value) => Ok(value),
        None => {
            let result = compute.await;
            match &result {
                Ok(value) => store.set(key.clone(), value.clone(), ttl).await,
                Err(err) => tracing::debug!(key = %key, error = %err, "computation failed, not cached"),
            }
            result
        }
    };
    registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&key);
    result
}
