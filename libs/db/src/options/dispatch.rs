//! Option dispatch: named appliers that write document values into
//! [`EngineOptions`].
//!
//! The table is the only place that knows option names. Adding an option means
//! registering an applier; resolution and building are unaffected:
//!
//! ```ignore
//! fn apply_paranoid_checks(
//!     opts: &mut EngineOptions,
//!     value: &Value,
//!     _cx: &ApplyContext<'_>,
//! ) -> ConfigResult<()> {
//!     let enabled = value.as_bool().unwrap_or(false);
//!     opts.rocksdb_mut().set_paranoid_checks(enabled);
//!     Ok(())
//! }
//!
//! let table = OptionTable::with_standard_options()
//!     .with_option("paranoid_checks", apply_paranoid_checks);
//! let builder = OptionsBuilder::with_table(table);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde_json::Value;

use crate::document::{expect_bool, expect_i32, expect_object, expect_u64, expect_usize};
use crate::error::{ConfigError, ConfigResult};
use crate::rocksdb::{
    BlockTable, BloomFilter, EngineOptions, FilterFormat, SharedCache,
    DEFAULT_MEMTABLE_MEMORY_BUDGET, DEFAULT_PARALLELISM,
};

pub const ALLOW_MMAP_READS: &str = "allow_mmap_reads";
pub const WRITE_BUFFER_SIZE: &str = "write_buffer_size";
pub const MAX_BYTES_FOR_LEVEL_BASE: &str = "max_bytes_for_level_base";
pub const TARGET_FILE_SIZE_BASE: &str = "target_file_size_base";
pub const MAX_WRITE_BUFFER_NUMBER: &str = "max_write_buffer_number";
pub const MAX_BACKGROUND_COMPACTIONS: &str = "max_background_compactions";
pub const MAX_BACKGROUND_FLUSHES: &str = "max_background_flushes";
pub const MIN_WRITE_BUFFER_NUMBER_TO_MERGE: &str = "min_write_buffer_number_to_merge";
pub const OPTIMIZE_LEVEL_STYLE_COMPACTION: &str = "optimize_level_style_compaction";
pub const INCREASE_PARALLELISM: &str = "increase_parallelism";
pub const BLOCK_BASED_TABLE_OPTIONS: &str = "block_based_table_options";

// Keys inside block_based_table_options
pub const BLOCK_SIZE: &str = "block_size";
pub const BLOOM_FILTER_POLICY: &str = "bloom_filter_policy";
pub const BITS_PER_KEY: &str = "bits_per_key";
pub const USE_BLOCK_BASED_BUILDER: &str = "use_block_based_builder";

// ============================================================================
// OptionApplier
// ============================================================================

/// State available to appliers beyond the options being built.
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    shared_cache: &'a SharedCache,
}

impl<'a> ApplyContext<'a> {
    pub fn new(shared_cache: &'a SharedCache) -> Self {
        Self { shared_cache }
    }

    /// The block cache every table must use.
    pub fn shared_cache(&self) -> &'a SharedCache {
        self.shared_cache
    }
}

/// Applies one configuration value to engine options.
pub trait OptionApplier: Send + Sync {
    fn apply(
        &self,
        options: &mut EngineOptions,
        value: &Value,
        cx: &ApplyContext<'_>,
    ) -> ConfigResult<()>;
}

impl<F> OptionApplier for F
where
    F: Fn(&mut EngineOptions, &Value, &ApplyContext<'_>) -> ConfigResult<()> + Send + Sync,
{
    fn apply(
        &self,
        options: &mut EngineOptions,
        value: &Value,
        cx: &ApplyContext<'_>,
    ) -> ConfigResult<()> {
        self(options, value, cx)
    }
}

// ============================================================================
// StandardOption
// ============================================================================

/// Options understood out of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardOption {
    AllowMmapReads,
    WriteBufferSize,
    MaxBytesForLevelBase,
    TargetFileSizeBase,
    MaxWriteBufferNumber,
    MaxBackgroundCompactions,
    MaxBackgroundFlushes,
    MinWriteBufferNumberToMerge,
    OptimizeLevelStyleCompaction,
    IncreaseParallelism,
    BlockBasedTableOptions,
}

impl StandardOption {
    pub const ALL: [StandardOption; 11] = [
        StandardOption::AllowMmapReads,
        StandardOption::WriteBufferSize,
        StandardOption::MaxBytesForLevelBase,
        StandardOption::TargetFileSizeBase,
        StandardOption::MaxWriteBufferNumber,
        StandardOption::MaxBackgroundCompactions,
        StandardOption::MaxBackgroundFlushes,
        StandardOption::MinWriteBufferNumberToMerge,
        StandardOption::OptimizeLevelStyleCompaction,
        StandardOption::IncreaseParallelism,
        StandardOption::BlockBasedTableOptions,
    ];

    /// Configuration key of this option.
    pub fn key(self) -> &'static str {
        match self {
            StandardOption::AllowMmapReads => ALLOW_MMAP_READS,
            StandardOption::WriteBufferSize => WRITE_BUFFER_SIZE,
            StandardOption::MaxBytesForLevelBase => MAX_BYTES_FOR_LEVEL_BASE,
            StandardOption::TargetFileSizeBase => TARGET_FILE_SIZE_BASE,
            StandardOption::MaxWriteBufferNumber => MAX_WRITE_BUFFER_NUMBER,
            StandardOption::MaxBackgroundCompactions => MAX_BACKGROUND_COMPACTIONS,
            StandardOption::MaxBackgroundFlushes => MAX_BACKGROUND_FLUSHES,
            StandardOption::MinWriteBufferNumberToMerge => MIN_WRITE_BUFFER_NUMBER_TO_MERGE,
            StandardOption::OptimizeLevelStyleCompaction => OPTIMIZE_LEVEL_STYLE_COMPACTION,
            StandardOption::IncreaseParallelism => INCREASE_PARALLELISM,
            StandardOption::BlockBasedTableOptions => BLOCK_BASED_TABLE_OPTIONS,
        }
    }
}

impl OptionApplier for StandardOption {
    fn apply(
        &self,
        options: &mut EngineOptions,
        value: &Value,
        cx: &ApplyContext<'_>,
    ) -> ConfigResult<()> {
        let key = self.key();
        match self {
            StandardOption::AllowMmapReads => {
                options.set_allow_mmap_reads(expect_bool(key, value)?)
            }
            StandardOption::WriteBufferSize => {
                options.set_write_buffer_size(expect_usize(key, value)?)
            }
            StandardOption::MaxBytesForLevelBase => {
                options.set_max_bytes_for_level_base(expect_u64(key, value)?)
            }
            StandardOption::TargetFileSizeBase => {
                options.set_target_file_size_base(expect_u64(key, value)?)
            }
            StandardOption::MaxWriteBufferNumber => {
                options.set_max_write_buffer_number(expect_i32(key, value)?)
            }
            StandardOption::MaxBackgroundCompactions => {
                options.set_max_background_compactions(expect_i32(key, value)?)
            }
            StandardOption::MaxBackgroundFlushes => {
                options.set_max_background_flushes(expect_i32(key, value)?)
            }
            StandardOption::MinWriteBufferNumberToMerge => {
                options.set_min_write_buffer_number_to_merge(expect_i32(key, value)?)
            }
            StandardOption::OptimizeLevelStyleCompaction => {
                if expect_bool(key, value)? {
                    options.optimize_level_style_compaction(DEFAULT_MEMTABLE_MEMORY_BUDGET);
                }
            }
            StandardOption::IncreaseParallelism => {
                if expect_bool(key, value)? {
                    options.increase_parallelism(DEFAULT_PARALLELISM);
                }
            }
            StandardOption::BlockBasedTableOptions => {
                options.set_block_table(block_table(value, cx.shared_cache())?)
            }
        }
        Ok(())
    }
}

/// Build a block-based table from its configuration object.
fn block_table(value: &Value, cache: &SharedCache) -> ConfigResult<BlockTable> {
    let obj = expect_object(BLOCK_BASED_TABLE_OPTIONS, value)?;
    let mut table = BlockTable::new(cache.clone());

    if let Some(v) = obj.get(BLOCK_SIZE) {
        table.block_size = Some(expect_usize(BLOCK_SIZE, v)?);
    }

    if let Some(v) = obj.get(BLOOM_FILTER_POLICY) {
        let policy = expect_object(BLOOM_FILTER_POLICY, v)?;

        // No default: a filter without a size is a configuration defect.
        let bits = policy
            .get(BITS_PER_KEY)
            .ok_or_else(|| ConfigError::missing_field(BLOOM_FILTER_POLICY, BITS_PER_KEY))?;
        let bits_per_key = expect_u64(BITS_PER_KEY, bits)?;

        let block_based = policy
            .get(USE_BLOCK_BASED_BUILDER)
            .map(|v| expect_bool(USE_BLOCK_BASED_BUILDER, v))
            .transpose()?
            .unwrap_or(false);

        table.bloom_filter = Some(BloomFilter {
            bits_per_key,
            format: if block_based {
                FilterFormat::BlockBased
            } else {
                FilterFormat::Full
            },
        });
    }

    Ok(table)
}

// ============================================================================
// OptionTable
// ============================================================================

lazy_static! {
    static ref STANDARD_OPTIONS: Arc<OptionTable> = Arc::new(OptionTable::with_standard_options());
}

/// Mapping from option key to applier.
#[derive(Clone, Default)]
pub struct OptionTable {
    entries: HashMap<String, Arc<dyn OptionApplier>>,
}

impl OptionTable {
    /// A table with no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared table of standard options.
    pub fn standard() -> Arc<OptionTable> {
        Arc::clone(&STANDARD_OPTIONS)
    }

    /// A fresh table holding the standard options, for extending.
    pub fn with_standard_options() -> Self {
        let mut table = Self::new();
        for option in StandardOption::ALL {
            table.register(option.key(), option);
        }
        table
    }

    /// Register `applier` under `key`, returning the applier it replaced.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        applier: impl OptionApplier + 'static,
    ) -> Option<Arc<dyn OptionApplier>> {
        self.entries.insert(key.into(), Arc::new(applier))
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_option(mut self, key: impl Into<String>, applier: impl OptionApplier + 'static) -> Self {
        self.register(key, applier);
        self
    }

    pub fn get(&self, key: &str) -> Option<&dyn OptionApplier> {
        self.entries.get(key).map(|a| a.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for OptionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionTable")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rocksdb::{EngineSettings, SharedCacheConfig};
    use serde_json::json;

    fn cache() -> SharedCache {
        SharedCache::new(SharedCacheConfig::with_capacity(1024 * 1024))
    }

    fn apply(key: &str, value: Value) -> ConfigResult<EngineOptions> {
        let cache = cache();
        let cx = ApplyContext::new(&cache);
        let mut opts = EngineOptions::new();
        OptionTable::standard()
            .get(key)
            .expect("standard option")
            .apply(&mut opts, &value, &cx)?;
        Ok(opts)
    }

    #[test]
    fn test_standard_table_keys() {
        let table = OptionTable::standard();
        assert_eq!(table.len(), StandardOption::ALL.len());
        for option in StandardOption::ALL {
            assert!(table.contains(option.key()), "missing {}", option.key());
        }
        assert!(!table.contains("frobnicate"));
    }

    #[test]
    fn test_scalar_options() {
        let opts = apply(WRITE_BUFFER_SIZE, json!(1048576)).unwrap();
        assert_eq!(opts.settings().write_buffer_size, Some(1048576));

        let opts = apply(ALLOW_MMAP_READS, json!(true)).unwrap();
        assert_eq!(opts.settings().allow_mmap_reads, Some(true));

        let opts = apply(MAX_BACKGROUND_COMPACTIONS, json!(4)).unwrap();
        assert_eq!(opts.settings().max_background_compactions, Some(4));

        let opts = apply(TARGET_FILE_SIZE_BASE, json!(67108864u64)).unwrap();
        assert_eq!(opts.settings().target_file_size_base, Some(67108864));
    }

    #[test]
    fn test_scalar_type_mismatch() {
        let err = apply(WRITE_BUFFER_SIZE, json!("1MB")).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { ref key, .. } if key == WRITE_BUFFER_SIZE));

        let err = apply(ALLOW_MMAP_READS, json!(1)).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));

        let err = apply(MAX_WRITE_BUFFER_NUMBER, json!(1u64 << 33)).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn test_trigger_options() {
        let opts = apply(OPTIMIZE_LEVEL_STYLE_COMPACTION, json!(true)).unwrap();
        assert_eq!(
            opts.settings().level_style_compaction_budget,
            Some(DEFAULT_MEMTABLE_MEMORY_BUDGET)
        );

        let opts = apply(OPTIMIZE_LEVEL_STYLE_COMPACTION, json!(false)).unwrap();
        assert_eq!(opts.settings(), &EngineSettings::default());

        let opts = apply(INCREASE_PARALLELISM, json!(true)).unwrap();
        assert_eq!(opts.settings().parallelism, Some(DEFAULT_PARALLELISM));

        assert!(apply(INCREASE_PARALLELISM, json!("yes")).is_err());
    }

    #[test]
    fn test_block_table_uses_shared_cache() {
        let cache = cache();
        let cx = ApplyContext::new(&cache);
        let mut opts = EngineOptions::new();
        StandardOption::BlockBasedTableOptions
            .apply(&mut opts, &json!({"block_size": 16384}), &cx)
            .unwrap();

        let table = opts.block_table().unwrap();
        assert!(table.block_cache().ptr_eq(&cache));
        assert_eq!(table.block_size, Some(16384));
        assert!(table.bloom_filter.is_none());
    }

    #[test]
    fn test_block_table_bloom_filter() {
        let opts = apply(
            BLOCK_BASED_TABLE_OPTIONS,
            json!({"bloom_filter_policy": {"bits_per_key": 10}}),
        )
        .unwrap();
        assert_eq!(
            opts.block_table().unwrap().bloom_filter,
            Some(BloomFilter {
                bits_per_key: 10,
                format: FilterFormat::Full
            })
        );

        let opts = apply(
            BLOCK_BASED_TABLE_OPTIONS,
            json!({"bloom_filter_policy": {"bits_per_key": 14, "use_block_based_builder": true}}),
        )
        .unwrap();
        assert_eq!(
            opts.block_table().unwrap().bloom_filter,
            Some(BloomFilter {
                bits_per_key: 14,
                format: FilterFormat::BlockBased
            })
        );
    }

    #[test]
    fn test_bloom_filter_requires_bits_per_key() {
        for policy in [
            json!({}),
            json!({"use_block_based_builder": true}),
            json!({"use_block_based_builder": false, "whole_key_filtering": true}),
        ] {
            let err = apply(
                BLOCK_BASED_TABLE_OPTIONS,
                json!({"block_size": 4096, "bloom_filter_policy": policy}),
            )
            .unwrap_err();
            assert_eq!(
                err,
                ConfigError::missing_field(BLOOM_FILTER_POLICY, BITS_PER_KEY)
            );
        }
    }

    #[test]
    fn test_block_table_shape_errors() {
        let err = apply(BLOCK_BASED_TABLE_OPTIONS, json!(true)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidShape { ref key, .. } if key == BLOCK_BASED_TABLE_OPTIONS));

        let err = apply(BLOCK_BASED_TABLE_OPTIONS, json!({"bloom_filter_policy": 10})).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidShape { ref key, .. } if key == BLOOM_FILTER_POLICY));

        let err = apply(
            BLOCK_BASED_TABLE_OPTIONS,
            json!({"bloom_filter_policy": {"bits_per_key": 10, "use_block_based_builder": 1}}),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    fn apply_paranoid_checks(
        opts: &mut EngineOptions,
        value: &Value,
        _cx: &ApplyContext<'_>,
    ) -> ConfigResult<()> {
        opts.rocksdb_mut()
            .set_paranoid_checks(expect_bool("paranoid_checks", value)?);
        Ok(())
    }

    #[test]
    fn test_register_function() {
        let table =
            OptionTable::with_standard_options().with_option("paranoid_checks", apply_paranoid_checks);
        assert!(table.contains("paranoid_checks"));
        assert_eq!(table.len(), StandardOption::ALL.len() + 1);

        let cache = cache();
        let cx = ApplyContext::new(&cache);
        let mut opts = EngineOptions::new();
        table
            .get("paranoid_checks")
            .unwrap()
            .apply(&mut opts, &json!(true), &cx)
            .unwrap();
        assert!(table
            .get("paranoid_checks")
            .unwrap()
            .apply(&mut opts, &json!("on"), &cx)
            .is_err());
    }

    #[test]
    fn test_register_replaces() {
        let mut table = OptionTable::new();
        assert!(table.is_empty());
        assert!(table
            .register(WRITE_BUFFER_SIZE, StandardOption::WriteBufferSize)
            .is_none());
        assert!(table
            .register(WRITE_BUFFER_SIZE, StandardOption::WriteBufferSize)
            .is_some());
        assert_eq!(table.keys(), vec![WRITE_BUFFER_SIZE]);
    }
}
