//! Label-indexed metric caches.
//!
//! A cache maps a label cache key to the single metric instance for that key.
//! Every strategy guarantees that concurrent first lookups of one key all
//! observe the same instance, and that at most one instance is ever stored.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Deserialize;

/// Key -> metric storage owned by a vector.
pub trait MetricCache<M>: Send + Sync {
    /// Return the metric stored under `key`, creating it with `make` if absent.
    fn get_or_insert_with(&self, key: &str, make: &mut dyn FnMut() -> M) -> Arc<M>;

    /// Snapshot of every stored metric, in no particular order.
    fn metrics(&self) -> Vec<Arc<M>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache implementation selected when a vector is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStrategy {
    /// Sharded concurrent map.
    #[default]
    Sharded,
    /// Single map behind a reader-writer lock.
    Locked,
}

impl CacheStrategy {
    pub fn build<M: Send + Sync + 'static>(self) -> Box<dyn MetricCache<M>> {
        match self {
            CacheStrategy::Sharded => Box::new(ShardedCache::new()),
            CacheStrategy::Locked => Box::new(LockedCache::new()),
        }
    }
}

/// `DashMap`-backed cache. Creation happens under the shard's write lock,
/// so `make` runs at most once per key.
pub struct ShardedCache<M> {
    map: DashMap<String, Arc<M>>,
}

impl<M> ShardedCache<M> {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }
}

impl<M> Default for ShardedCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + Sync> MetricCache<M> for ShardedCache<M> {
    fn get_or_insert_with(&self, key: &str, make: &mut dyn FnMut() -> M) -> Arc<M> {
        if let Some(m) = self.map.get(key) {
            return Arc::clone(m.value());
        }
        let entry = self
            .map
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(make()));
        Arc::clone(entry.value())
    }

    fn metrics(&self) -> Vec<Arc<M>> {
        self.map.iter().map(|r| Arc::clone(r.value())).collect()
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// `RwLock<HashMap>` cache. Reads share the lock; a miss re-checks under the
/// write lock before inserting.
pub struct LockedCache<M> {
    map: RwLock<HashMap<String, Arc<M>>>,
}

impl<M> LockedCache<M> {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }
}

impl<M> Default for LockedCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + Sync> MetricCache<M> for LockedCache<M> {
    fn get_or_insert_with(&self, key: &str, make: &mut dyn FnMut() -> M) -> Arc<M> {
        if let Some(m) = self.map.read().get(key) {
            return Arc::clone(m);
        }
        let mut map = self.map.write();
        if let Some(m) = map.get(key) {
            return Arc::clone(m);
        }
        let m = Arc::new(make());
        map.insert(key.to_owned(), Arc::clone(&m));
        m
    }

    fn metrics(&self) -> Vec<Arc<M>> {
        self.map.read().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.map.read().len()
    }
}
