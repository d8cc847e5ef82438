//! Session cache limits.

use std::time::Duration;

/// Sizing and expiry for a [`SessionCache`](crate::SessionCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Most sessions held at once; the least recently used is evicted first.
    pub capacity: usize,

    /// Sessions untouched for this long are dropped. `None` keeps them until
    /// evicted.
    pub idle_ttl: Option<Duration>,

    /// How often a background sweep removes expired sessions. `None` leaves
    /// them to be dropped when next looked up.
    pub sweep_interval: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            idle_ttl: Some(Duration::from_secs(24 * 60 * 60)),
            sweep_interval: Some(Duration::from_secs(60)),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_idle_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.idle_ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.sweep_interval = interval;
        self
    }
}
