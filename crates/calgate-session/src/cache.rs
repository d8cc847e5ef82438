//! In-process session store: LRU-bounded, with idle expiry.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::ttl::TtlTracker;

struct CacheInner<V> {
    lru: LruCache<String, V>,
    ttl: TtlTracker,
}

impl<V> CacheInner<V> {
    /// Drop the entry if its TTL has lapsed. Returns true if it did.
    fn evict_if_expired(&mut self, session_id: &str) -> bool {
        if self.lru.contains(session_id) && self.ttl.is_expired(session_id) {
            debug!(session_id = %session_id, "Session expired, removing from cache");
            self.lru.pop(session_id);
            self.ttl.remove(session_id);
            return true;
        }
        false
    }
}

/// Session cache with LRU eviction and optional idle TTL.
///
/// Cloning yields another handle to the same cache.
pub struct SessionCache<V> {
    inner: Arc<RwLock<CacheInner<V>>>,
    config: CacheConfig,
}

impl<V> SessionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty cache.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let cap = NonZeroUsize::new(config.capacity).ok_or_else(|| {
            Error::InvalidConfig("capacity must be at least 1".to_string())
        })?;

        let inner = CacheInner {
            lru: LruCache::new(cap),
            ttl: TtlTracker::new(config.idle_ttl),
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            config,
        })
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of cached sessions, including ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    /// Fetch a session, marking it recently used and resetting its TTL.
    pub async fn get(&self, session_id: &str) -> Result<V> {
        let mut inner = self.inner.write().await;

        if inner.evict_if_expired(session_id) {
            return Err(Error::Expired(session_id.to_string()));
        }

        match inner.lru.get(session_id).cloned() {
            Some(value) => {
                inner.ttl.touch(session_id);
                trace!(session_id = %session_id, "Session found in cache");
                Ok(value)
            }
            None => Err(Error::NotFound(session_id.to_string())),
        }
    }

    /// Insert or replace a session.
    ///
    /// At capacity, the least recently used session is evicted.
    pub async fn insert(&self, session_id: &str, value: V) {
        let mut inner = self.inner.write().await;

        if let Some((evicted_id, _)) = inner.lru.push(session_id.to_string(), value)
            && evicted_id != session_id
        {
            debug!(session_id = %evicted_id, "Evicted LRU session to make room");
            inner.ttl.remove(&evicted_id);
        }
        inner.ttl.touch(session_id);

        trace!(
            session_id = %session_id,
            cache_size = inner.lru.len(),
            "Session stored in cache"
        );
    }

    /// Remove a session, returning its value if it was live.
    pub async fn remove(&self, session_id: &str) -> Option<V> {
        let mut inner = self.inner.write().await;
        let expired = inner.ttl.is_expired(session_id);
        inner.ttl.remove(session_id);
        inner.lru.pop(session_id).filter(|_| !expired)
    }

    /// Check if a live session exists, without touching it.
    pub async fn contains(&self, session_id: &str) -> bool {
        let inner = self.inner.read().await;
        inner.lru.contains(session_id) && !inner.ttl.is_expired(session_id)
    }

    /// Read a session without updating LRU order or TTL.
    pub async fn peek(&self, session_id: &str) -> Option<V> {
        let inner = self.inner.read().await;
        if inner.ttl.is_expired(session_id) {
            None
        } else {
            inner.lru.peek(session_id).cloned()
        }
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let expired = inner.ttl.drain_expired();
        let mut count = 0;

        for session_id in expired {
            if inner.lru.pop(&session_id).is_some() {
                count += 1;
            }
        }

        if count > 0 {
            debug!(count = count, "Cleaned up expired sessions");
        }

        count
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            size: inner.lru.len(),
            capacity: self.config.capacity,
            ttl_tracked: inner.ttl.len(),
        }
    }

    /// Start the background sweep configured by `sweep_interval`, if any.
    pub fn spawn_sweeper(&self) -> Option<JoinHandle<()>> {
        self.config.sweep_interval.map(|interval| self.spawn_cleanup_task(interval))
    }

    /// Sweep expired sessions every `interval` on the Tokio runtime.
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_cleanup_task(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.cleanup_expired().await;
            }
        })
    }
}

impl<V> Clone for SessionCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of cached sessions.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Number of sessions being tracked for TTL.
    pub ttl_tracked: usize,
}
