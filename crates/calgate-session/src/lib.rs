//! Session cache with LRU eviction and idle TTL.
//!
//! Sessions live only in process memory:
//! - LRU eviction bounds memory when many browsers log in
//! - an idle TTL drops sessions nobody has touched for a while
//! - an optional background task sweeps expired entries
//!
//! # Example
//!
//! ```rust,ignore
//! use calgate_session::{CacheConfig, SessionCache};
//!
//! let config = CacheConfig::default()
//!     .with_capacity(1000)
//!     .with_idle_ttl(Some(Duration::from_secs(3600)));
//!
//! let cache: SessionCache<MyRecord> = SessionCache::new(config)?;
//! ```

mod cache;
mod config;
mod error;
mod ttl;

pub use cache::{CacheStats, SessionCache};
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use ttl::TtlTracker;
