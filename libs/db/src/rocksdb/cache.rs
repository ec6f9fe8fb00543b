//! Shared block cache handle and its once-only slot.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::config::{SharedCacheConfig, MAX_NUM_SHARD_BITS};
use crate::document::Object;
use crate::error::ConfigResult;

// ============================================================================
// SharedCache
// ============================================================================

/// Reference-counted handle to the block cache shared by every index.
///
/// Clones refer to the same native cache. The configuration it was created
/// with is kept alongside for inspection.
#[derive(Clone)]
pub struct SharedCache {
    inner: Arc<SharedCacheInner>,
}

struct SharedCacheInner {
    config: SharedCacheConfig,
    cache: rocksdb::Cache,
}

impl SharedCache {
    /// Create a new LRU block cache with the configured capacity and shard bits.
    ///
    /// `num_shard_bits` must already be within `0..=MAX_NUM_SHARD_BITS`;
    /// [`SharedCacheConfig::from_global_scope`] enforces this.
    pub fn new(config: SharedCacheConfig) -> Self {
        debug_assert!((0..=MAX_NUM_SHARD_BITS).contains(&config.num_shard_bits));
        let mut lru = rocksdb::LruCacheOptions::default();
        lru.set_capacity(config.capacity_bytes);
        lru.set_num_shard_bits(config.num_shard_bits);
        let cache = rocksdb::Cache::new_lru_cache_opts(&lru);
        Self {
            inner: Arc::new(SharedCacheInner { config, cache }),
        }
    }

    /// Capacity in bytes the cache was created with.
    pub fn capacity(&self) -> usize {
        self.inner.config.capacity_bytes
    }

    /// Shard bits the cache was configured with.
    pub fn num_shard_bits(&self) -> i32 {
        self.inner.config.num_shard_bits
    }

    /// The configuration the cache was created with.
    pub fn config(&self) -> &SharedCacheConfig {
        &self.inner.config
    }

    /// The native cache, for attaching to table options.
    pub fn rocksdb_cache(&self) -> &rocksdb::Cache {
        &self.inner.cache
    }

    /// Current memory charged to the cache.
    pub fn usage(&self) -> usize {
        self.inner.cache.get_usage()
    }

    /// Whether two handles refer to the same cache.
    pub fn ptr_eq(&self, other: &SharedCache) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for SharedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCache")
            .field("capacity", &self.capacity())
            .field("num_shard_bits", &self.num_shard_bits())
            .finish()
    }
}

// ============================================================================
// SharedCacheSlot
// ============================================================================

/// Holds at most one [`SharedCache`] for the lifetime of its owner.
///
/// The first successful [`ensure`](Self::ensure) creates the cache from its
/// `global` scope. Concurrent first callers block until the winner finishes and
/// then all observe the same handle. Later calls ignore their argument.
#[derive(Default)]
pub struct SharedCacheSlot {
    cell: OnceCell<SharedCache>,
}

impl SharedCacheSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache, if it has been created.
    pub fn get(&self) -> Option<&SharedCache> {
        self.cell.get()
    }

    /// Return the cache, creating it from `global` on first use.
    ///
    /// A configuration error leaves the slot empty.
    pub fn ensure(&self, global: &Object) -> ConfigResult<SharedCache> {
        self.cell
            .get_or_try_init(|| -> ConfigResult<SharedCache> {
                let config = SharedCacheConfig::from_global_scope(global)?;
                let cache = SharedCache::new(config);
                tracing::info!(
                    capacity_mb = cache.capacity() / (1024 * 1024),
                    num_shard_bits = cache.num_shard_bits(),
                    "Created shared block cache"
                );
                Ok(cache)
            })
            .cloned()
    }
}

impl std::fmt::Debug for SharedCacheSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCacheSlot")
            .field("cache", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use serde_json::{json, Value};

    fn global(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_shared_cache_clone_is_same_cache() {
        let cache = SharedCache::new(SharedCacheConfig::with_capacity(1024 * 1024));
        let clone = cache.clone();
        assert!(cache.ptr_eq(&clone));
        assert_eq!(clone.capacity(), 1024 * 1024);

        let other = SharedCache::new(SharedCacheConfig::with_capacity(1024 * 1024));
        assert!(!cache.ptr_eq(&other));
    }

    #[test]
    fn test_shared_cache_at_shard_bit_bounds() {
        for bits in [0, MAX_NUM_SHARD_BITS] {
            let cache = SharedCache::new(SharedCacheConfig {
                capacity_bytes: 1024 * 1024,
                num_shard_bits: bits,
            });
            assert_eq!(cache.num_shard_bits(), bits);
            // Reads through the native handle
            assert!(cache.usage() <= cache.capacity());
        }
    }

    #[test]
    fn test_slot_first_caller_wins() {
        let slot = SharedCacheSlot::new();
        assert!(slot.get().is_none());

        let first = slot
            .ensure(&global(json!({"shared_cache": {"capacity": 2097152}})))
            .unwrap();
        let second = slot
            .ensure(&global(json!({"shared_cache": {"capacity": 4194304, "num_shard_bits": 2}})))
            .unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(second.capacity(), 2097152);
        assert_eq!(second.num_shard_bits(), 4);
    }

    #[test]
    fn test_slot_ignores_global_once_created() {
        let slot = SharedCacheSlot::new();
        slot.ensure(&global(json!({"shared_cache": {}}))).unwrap();

        // Missing shared_cache would fail on first use, not afterwards.
        let cache = slot.ensure(&global(json!({}))).unwrap();
        assert_eq!(cache.capacity(), SharedCacheConfig::default().capacity_bytes);
    }

    #[test]
    fn test_slot_failed_init_stays_empty() {
        let slot = SharedCacheSlot::new();
        let err = slot
            .ensure(&global(json!({"shared_cache": {"num_shard_bits": "four"}})))
            .unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
        assert!(slot.get().is_none());

        let cache = slot
            .ensure(&global(json!({"shared_cache": {"num_shard_bits": 3}})))
            .unwrap();
        assert_eq!(cache.num_shard_bits(), 3);
    }
}
