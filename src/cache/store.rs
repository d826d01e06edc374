//! Cache Store Module
//!
//! Main cache engine combining the slot list with a transient hash index
//! and the capacity/expiry controller, plus the recovery protocol that
//! rebuilds the index after the slot list has been restored from a prior
//! run's image.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::cache::list::{Iter, SlotList};
use crate::cache::slot::{current_timestamp, deadline_for, Rehydrate};
use crate::cache::stats::CacheStats;
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Slot Cache ==
/// Fixed-capacity cache with LRU eviction and optional TTL expiration.
///
/// Every access (read or write) touches the entry: it moves to the
/// most-recently-used end of the recency list and its deadline is refreshed.
/// List order therefore reflects both recency and non-decreasing expiration
/// deadlines, which lets the expiry sweep inspect only the front slot.
///
/// Single-threaded by design; callers needing shared access serialize
/// externally. The expiry sweep assumes a non-decreasing clock.
#[derive(Debug)]
pub struct SlotCache<K, V> {
    /// Persistable core: slot array, recency list, free pool
    list: SlotList<K, V>,
    /// Transient key-to-position index, rebuilt on recovery
    index: HashMap<K, usize>,
    /// Performance statistics
    stats: CacheStats,
    /// Per-entry TTL in seconds, 0 = expiration disabled
    ttl_seconds: u64,
}

impl<K, V> SlotCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries the cache can hold
    /// * `ttl_seconds` - Per-entry TTL refreshed on every touch (0 disables
    ///   expiration; the clock is then never consulted)
    pub fn new(capacity: usize, ttl_seconds: u64) -> Self {
        Self {
            list: SlotList::new(capacity),
            index: HashMap::with_capacity(capacity),
            stats: CacheStats::new(),
            ttl_seconds,
        }
    }

    /// Creates an empty cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.capacity, config.ttl_seconds)
    }

    // == Accessors ==
    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.list.capacity()
    }

    /// Configured TTL in seconds (0 = disabled).
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Current number of entries; derived from free-pool occupancy, O(1).
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    // == Put ==
    /// Stores a key-value pair, returning a reference to the stored value.
    ///
    /// An existing key is overwritten in place and touched. A new key takes
    /// a free slot; when none is free the least-recently-used entry is
    /// evicted first, regardless of its expiration state. Failure is only
    /// possible with a zero-capacity configuration.
    pub fn put(&mut self, key: K, value: V) -> Result<&mut V> {
        self.reclaim_for_insert();
        self.reclaim_expired();

        let deadline = self.deadline();

        // Overwrite case: value replaced in place, entry touched
        if let Some(&pos) = self.index.get(&key) {
            self.list.append(pos, deadline);
            return Ok(self.list.slot_mut(pos).value.insert(value));
        }

        let Some(pos) = self.list.acquire() else {
            return Err(CacheError::CapacityExhausted(format!(
                "no slot available at capacity {}",
                self.capacity()
            )));
        };

        self.list.slot_mut(pos).key = Some(key.clone());
        self.list.append(pos, deadline);
        self.index.insert(key, pos);
        self.stats.set_total_entries(self.list.len());

        Ok(self.list.slot_mut(pos).value.insert(value))
    }

    // == Get ==
    /// Retrieves a value by key, touching the entry.
    ///
    /// The expiry sweep runs first and may evict the front entry, including
    /// the requested key when it is both least-recently-used and expired.
    /// On a hit the entry moves to most-recently-used and its deadline is
    /// refreshed; a read is indistinguishable from a write for recency and
    /// expiry purposes.
    pub fn get(&mut self, key: &K) -> Result<&V> {
        self.reclaim_expired();

        let Some(&pos) = self.index.get(key) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound);
        };

        let deadline = self.deadline();
        self.list.append(pos, deadline);
        self.stats.record_hit();
        self.list.slot(pos).value.as_ref().ok_or(CacheError::NotFound)
    }

    // == Remove ==
    /// Removes an entry by key, returning its value.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        let Some(pos) = self.index.remove(key) else {
            return Err(CacheError::NotFound);
        };

        self.list.detach(pos);
        let slot = self.list.slot_mut(pos);
        slot.key = None;
        let value = slot.value.take();
        self.list.release(pos);
        self.stats.set_total_entries(self.list.len());

        value.ok_or(CacheError::NotFound)
    }

    // == Contains ==
    /// Checks for a live entry without touching it.
    ///
    /// Reports false for an entry whose deadline has already passed, even
    /// if the lazy sweep has not reached it yet.
    pub fn contains(&self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&pos) => !self.list.slot(pos).is_expired(self.now()),
            None => false,
        }
    }

    // == Purge Expired ==
    /// Evicts every expired entry, returning how many were removed.
    ///
    /// Walks the front of the recency list while the front slot is expired;
    /// the monotonic deadline order bounds the walk to exactly the expired
    /// prefix, so live entries are never inspected.
    pub fn purge_expired(&mut self) -> usize {
        if self.ttl_seconds == 0 {
            return 0;
        }

        let now = current_timestamp();
        let mut removed = 0;
        while let Some(front) = self.list.front() {
            if !self.list.slot(front).is_expired(now) {
                break;
            }
            self.evict(front);
            self.stats.record_expiration();
            removed += 1;
        }

        if removed > 0 {
            debug!("purged {} expired entries", removed);
        }
        removed
    }

    // == Clear ==
    /// Drops every entry.
    ///
    /// Resets the free pool, the sentinel, and the index without visiting
    /// individual slots; stale slot contents are overwritten on reuse.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
        self.stats.set_total_entries(0);
        debug!("cache cleared");
    }

    // == Iteration ==
    /// Iterates over live entries from least- to most-recently-used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.list.iter()
    }

    /// Deadlines in list order, front to back. Test support.
    #[cfg(test)]
    pub(crate) fn deadlines_in_list_order(&self) -> Vec<u64> {
        let sentinel = self.list.sentinel();
        let mut deadlines = Vec::with_capacity(self.list.len());
        let mut current = self.list.slot(sentinel).next;
        while current != sentinel {
            deadlines.push(self.list.slot(current).expire_at);
            current = self.list.slot(current).next;
        }
        deadlines
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.list.len());
        stats
    }

    // == Recovery ==
    /// Rebuilds the index from a walk of the recency list.
    ///
    /// Intended for use after the slot list has been restored from a prior
    /// run's image, where the structural links and slot contents are intact
    /// but the index is invalid. Linkage is validated first and a
    /// [`CacheError::RecoveryPrecondition`] is returned on broken cycles,
    /// out-of-range positions, free-pool/list disagreement, or duplicate
    /// keys; after such an error the index is unspecified and the store
    /// must not be used. Each visited key and value is rehydrated in place
    /// before reinsertion, a no-op for plain-data types.
    ///
    /// Safe to invoke defensively on an already-consistent cache; a second
    /// call rebuilds the same index.
    pub fn recover(&mut self) -> Result<usize>
    where
        K: Rehydrate,
        V: Rehydrate,
    {
        let expected = self.list.validate()?;

        self.index.clear();
        let sentinel = self.list.sentinel();
        let mut current = self.list.slot(sentinel).next;
        while current != sentinel {
            let next = self.list.slot(current).next;
            let slot = self.list.slot_mut(current);
            if let Some(key) = slot.key.as_mut() {
                key.rehydrate();
            }
            if let Some(value) = slot.value.as_mut() {
                value.rehydrate();
            }
            // validate() guarantees the key is present
            if let Some(key) = slot.key.as_ref() {
                if self.index.insert(key.clone(), current).is_some() {
                    return Err(CacheError::RecoveryPrecondition(format!(
                        "duplicate key at position {}",
                        current
                    )));
                }
            }
            current = next;
        }

        self.stats.set_total_entries(self.list.len());
        debug!("recovered index over {} entries", expected);
        Ok(expected)
    }

    /// Adopts a restored slot list, validates it, and rebuilds the index.
    ///
    /// This is the restart seam: persist the list obtained from
    /// [`detach`](Self::detach), restore it byte-faithfully, then attach.
    /// Statistics start from zero; they are not part of the persisted core.
    pub fn attach(list: SlotList<K, V>, ttl_seconds: u64) -> Result<Self>
    where
        K: Rehydrate,
        V: Rehydrate,
    {
        let mut cache = Self {
            index: HashMap::with_capacity(list.capacity()),
            list,
            stats: CacheStats::new(),
            ttl_seconds,
        };
        cache.recover()?;
        Ok(cache)
    }

    /// Surrenders the persistable core (slot array, recency list, free
    /// pool) for the caller to store. The transient index is discarded.
    pub fn detach(self) -> SlotList<K, V> {
        self.list
    }

    // == Capacity/Expiry Controller ==
    /// Makes room before an insert: when the free pool is empty, the
    /// least-recently-used entry is evicted whether or not it has expired.
    /// Capacity pressure always wins.
    fn reclaim_for_insert(&mut self) {
        if self.list.len() < self.capacity() {
            return;
        }
        let Some(front) = self.list.front() else {
            // Zero-capacity configuration: nothing to reclaim
            return;
        };
        trace!("evicting least-recently-used entry under capacity pressure");
        self.evict(front);
        self.stats.record_eviction();
    }

    /// Lazy expiration sweep: inspects only the front-of-list slot and
    /// evicts it when its deadline has passed.
    ///
    /// Checking a single slot suffices because deadlines are non-decreasing
    /// in list order; no other entry can be expired while the front is not.
    /// A clock that moves backward can stall the sweep behind a non-expired
    /// front entry; that precondition is the caller's to uphold.
    fn reclaim_expired(&mut self) {
        if self.ttl_seconds == 0 {
            return;
        }
        let Some(front) = self.list.front() else {
            return;
        };
        if self.list.slot(front).is_expired(current_timestamp()) {
            trace!("sweeping expired front entry");
            self.evict(front);
            self.stats.record_expiration();
        }
    }

    /// Removes the slot's key from the index, unlinks it, and returns its
    /// position to the free pool.
    fn evict(&mut self, pos: usize) {
        self.list.detach(pos);
        let slot = self.list.slot_mut(pos);
        if let Some(key) = slot.key.take() {
            self.index.remove(&key);
        }
        slot.value = None;
        self.list.release(pos);
        self.stats.set_total_entries(self.list.len());
    }

    /// Deadline for a fresh touch under the configured TTL.
    fn deadline(&self) -> u64 {
        deadline_for(self.ttl_seconds)
    }

    /// Current time in seconds, or 0 when TTL is disabled (the clock is
    /// never consulted in that case).
    fn now(&self) -> u64 {
        if self.ttl_seconds == 0 {
            0
        } else {
            current_timestamp()
        }
    }
}
