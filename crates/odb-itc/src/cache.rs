//! A generic singleflight + LRU cache (§4.2, §9 "Cache keys").
//!
//! Concurrent callers for the same key share one computation: the first
//! caller in drives the real call, the rest block on the same
//! [`OnceLock`] and observe its result. Only successful results are
//! promoted into the LRU; a failed call is not cached and the next
//! caller retries it.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock};

/// A cache combining request coalescing ("singleflight") with bounded,
/// least-recently-used eviction.
pub struct SingleflightLruCache<K, V> {
    capacity: usize,
    entries: Mutex<IndexMap<K, V>>,
    inflight: Mutex<HashMap<K, Arc<OnceLock<Result<V, String>>>>>,
}

impl<K, V> SingleflightLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Construct an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(IndexMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Return a cached value for `key` without triggering computation or
    /// affecting recency order.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.entries.lock().expect("cache lock poisoned").get(key).cloned()
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    /// `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key`, computing and caching it via
    /// `compute` if absent. Concurrent calls for the same `key` share one
    /// invocation of `compute`. Errors from `compute` are carried as
    /// plain strings and never cached; the next caller retries.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<V, String>
    where
        F: FnOnce() -> Result<V, String>,
    {
        if let Some(hit) = self.get_and_promote(&key) {
            return Ok(hit);
        }

        let once = {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceLock::new()))
                .clone()
        };

        let result = once.get_or_init(compute).clone();

        {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            inflight.remove(&key);
        }

        if let Ok(value) = &result {
            self.insert(key, value.clone());
        }
        result
    }

    fn get_and_promote(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let value = entries.get(key).cloned()?;
        // Move to the back (most-recently-used end).
        entries.shift_remove(key);
        entries.insert(key.clone(), value.clone());
        Some(value)
    }

    fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.shift_remove(&key);
        entries.insert(key, value);
        while entries.len() > self.capacity {
            entries.shift_remove_index(0);
        }
    }
}
