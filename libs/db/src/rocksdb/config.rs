//! Configuration types for the shared RocksDB block cache.

use crate::document::{expect_i32, expect_object, expect_usize, Object};
use crate::error::{ConfigError, ConfigResult};

/// Key of the shared cache object inside the `global` scope.
pub const SHARED_CACHE: &str = "shared_cache";
/// Cache capacity in bytes.
pub const CAPACITY: &str = "capacity";
/// Number of bits used to pick a cache shard.
pub const NUM_SHARD_BITS: &str = "num_shard_bits";

/// Default shared cache capacity: 1GiB.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024 * 1024 * 1024;
/// Default shard bits: 16 shards.
pub const DEFAULT_NUM_SHARD_BITS: i32 = 4;
/// Largest shard bits RocksDB accepts for an LRU cache.
pub const MAX_NUM_SHARD_BITS: i32 = 19;

// ============================================================================
// SharedCacheConfig
// ============================================================================

/// Configuration for the block cache shared by every index.
///
/// RocksDB's block cache stores uncompressed data blocks. One cache across all
/// indices bounds total memory while letting hot indices take more of it.
///
/// See [RocksDB Block Cache Wiki](https://github.com/facebook/rocksdb/wiki/Block-Cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedCacheConfig {
    /// Total cache size in bytes.
    /// Default: 1GiB.
    pub capacity_bytes: usize,

    /// The cache is split into `2^num_shard_bits` shards.
    /// Default: 4.
    pub num_shard_bits: i32,
}

impl Default for SharedCacheConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CACHE_CAPACITY,
            num_shard_bits: DEFAULT_NUM_SHARD_BITS,
        }
    }
}

impl SharedCacheConfig {
    /// Create config with specified capacity, using the default shard bits.
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            ..Default::default()
        }
    }

    /// Read the `shared_cache` object of a `global` scope.
    ///
    /// The object itself is required; `capacity` and `num_shard_bits` fall
    /// back to their defaults when absent. `num_shard_bits` must lie in
    /// `0..=MAX_NUM_SHARD_BITS`.
    pub fn from_global_scope(global: &Object) -> ConfigResult<Self> {
        let value = global
            .get(SHARED_CACHE)
            .ok_or_else(|| ConfigError::missing_scope(SHARED_CACHE))?;
        let obj = expect_object(SHARED_CACHE, value)?;

        let mut config = Self::default();
        if let Some(v) = obj.get(CAPACITY) {
            config.capacity_bytes = expect_usize(CAPACITY, v)?;
        }
        if let Some(v) = obj.get(NUM_SHARD_BITS) {
            let bits = expect_i32(NUM_SHARD_BITS, v)?;
            if !(0..=MAX_NUM_SHARD_BITS).contains(&bits) {
                return Err(ConfigError::type_mismatch(
                    NUM_SHARD_BITS,
                    "an integer between 0 and 19",
                    bits.to_string(),
                ));
            }
            config.num_shard_bits = bits;
        }
        Ok(config)
    }
}
