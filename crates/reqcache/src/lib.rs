//! TTL + stale-while-revalidate response cache with conditional revalidation.
//!
//! Unlike a generic memoization cache keyed by an opaque key type, this cache
//! is shaped around HTTP semantics specifically: entries expire on a TTL, may
//! be served stale for a further stale-while-revalidate window while a
//! background refresh is attempted, and carry the validators
//! (`ETag`/`Last-Modified`) needed to make that refresh a conditional
//! request. There is no capacity-bounded eviction here — entries only leave
//! the store via expiry or explicit invalidation.
//!
//! ```
//! use reqcache::{CacheKey, CacheStore, CachedResponse, DefaultCachePolicy};
//! use std::time::Duration;
//!
//! let store = CacheStore::new();
//! let key = CacheKey::fingerprint("GET", "https://api.example.com/widgets", &[], &[]);
//! let response = CachedResponse::new(200, vec![], Vec::new());
//! store.insert(key.clone(), response, Duration::from_secs(60), None);
//! assert!(store.get(&key, &DefaultCachePolicy).is_some());
//! ```

mod entry;
mod key;
mod policy;
mod store;

pub use entry::{CacheEntry, CachedResponse, Freshness};
pub use key::CacheKey;
pub use policy::{CachePolicy, DefaultCachePolicy};
pub use store::{CacheStats, CacheStore};
