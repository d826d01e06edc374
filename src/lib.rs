//! Slotcache - a fixed-capacity in-process cache
//!
//! Provides key/value caching with LRU eviction and optional per-entry TTL
//! expiration over a pre-allocated array of N+1 slot records. Recency order
//! lives in an intrusive doubly linked list threaded through the slots with
//! index-based links, so the whole persistable core can be detached,
//! stored, and re-attached after a restart; the hash index is derived state
//! and is rebuilt by the recovery protocol.
//!
//! ```
//! use slotcache::SlotCache;
//!
//! let mut cache = SlotCache::new(2, 0);
//! cache.put("a", 1).unwrap();
//! cache.put("b", 2).unwrap();
//!
//! // Reading "a" makes it most recently used...
//! assert_eq!(cache.get(&"a"), Ok(&1));
//!
//! // ...so inserting at capacity evicts "b" instead.
//! cache.put("c", 3).unwrap();
//! assert!(cache.get(&"b").is_err());
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, Rehydrate, SlotCache, SlotList};
pub use config::Config;
pub use error::{CacheError, Result};
