//! Time-bounded collection cache.
//!
//! A thin adapter over a key-value [`CacheStore`]. Caching is best-effort:
//! store faults and corrupt entries are logged and treated as misses, and a
//! cache with no store behaves as an always-empty one. Freshness is checked
//! on read; stores are free to keep stale entries around.
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CacheSettings;
use crate::error::CacheError;
use crate::models::UserCollection;

#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

// Browser stores hold JS handles, which are neither Send nor Sync.
#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

/// Raw key-value storage for serialized cache entries.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CacheStore: MaybeSendSync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// `ttl` is a retention hint for stores with native expiry.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process store. Ignores the retention hint.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
pub struct MemoryStore {
    entries: tokio::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String, _ttl: Duration) -> Result<(), CacheError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Stored shape: `{ "data": …, "cachedAt": ms, "expiresAt": ms }`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    /// Epoch milliseconds.
    pub cached_at: i64,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() < self.expires_at
    }
}

/// Result of [`CollectionCache::read_through`].
#[derive(Clone, Debug, PartialEq)]
pub struct Lookup<T> {
    pub data: T,
    pub from_cache: bool,
    /// Set when served from cache.
    pub cached_at: Option<i64>,
}

pub type Clock = fn() -> DateTime<Utc>;

/// Per-owner cache of computed collections. Owner ids are case-insensitive.
pub struct CollectionCache<T = UserCollection> {
    store: Option<Arc<dyn CacheStore>>,
    settings: CacheSettings,
    clock: Clock,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            settings: self.settings.clone(),
            clock: self.clock,
            _payload: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> CollectionCache<T> {
    pub fn new(store: Option<Arc<dyn CacheStore>>, settings: CacheSettings) -> Self {
        Self {
            store,
            settings,
            clock: Utc::now,
            _payload: PhantomData,
        }
    }

    /// A cache with no backing store: every read misses, writes are dropped.
    pub fn disabled() -> Self {
        Self::new(None, CacheSettings::default())
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn key_for(&self, owner: &str) -> String {
        format!("{}{}", self.settings.key_prefix, owner.to_lowercase())
    }

    pub async fn read(&self, owner: &str) -> Option<CacheEntry<T>> {
        let store = self.store.as_ref()?;
        let key = self.key_for(owner);

        let raw = match store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(%key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(%key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(%key, error = %e, "discarding unreadable cache entry");
                return None;
            }
        };

        if !entry.is_fresh_at((self.clock)()) {
            debug!(%key, expires_at = entry.expires_at, "cache entry expired");
            return None;
        }

        debug!(%key, cached_at = entry.cached_at, "cache hit");
        Some(entry)
    }

    pub async fn write(&self, owner: &str, data: &T) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let key = self.key_for(owner);

        let now = (self.clock)().timestamp_millis();
        let ttl_ms = i64::try_from(self.settings.ttl().as_millis()).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now.saturating_add(ttl_ms),
        };

        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%key, error = %e, "cache entry serialization failed");
                return;
            }
        };

        if let Err(e) = store.put(&key, raw, self.settings.ttl()).await {
            warn!(%key, error = %e, "cache write failed");
        }
    }

    pub async fn invalidate(&self, owner: &str) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let key = self.key_for(owner);
        if let Err(e) = store.delete(&key).await {
            warn!(%key, error = %e, "cache invalidation failed");
        }
    }

    /// Serves a fresh cached entry, or runs `fetch`, caches its result and
    /// returns it. Fetch errors are returned as-is and nothing is cached.
    pub async fn read_through<F, Fut, E>(&self, owner: &str, fetch: F) -> Result<Lookup<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(entry) = self.read(owner).await {
            return Ok(Lookup {
                data: entry.data,
                from_cache: true,
                cached_at: Some(entry.cached_at),
            });
        }

        let data = fetch().await?;
        self.write(owner, &data).await;
        Ok(Lookup {
            data,
            from_cache: false,
            cached_at: None,
        })
    }
}
