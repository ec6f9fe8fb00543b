//! Engine options populated by the option dispatch table.
//!
//! `EngineOptions` owns the native `rocksdb::Options` together with a plain
//! mirror of every value written to it. The native type has setters only, so
//! the mirror is what callers and tests inspect.

use rocksdb::{BlockBasedOptions, Options};

use super::cache::SharedCache;

/// Memtable budget passed to the level-style compaction preset: 512MB.
pub const DEFAULT_MEMTABLE_MEMORY_BUDGET: usize = 512 * 1024 * 1024;

/// Background threads requested by the parallelism preset.
pub const DEFAULT_PARALLELISM: i32 = 16;

// ============================================================================
// EngineSettings
// ============================================================================

/// Values written to an [`EngineOptions`], `None` where left at the RocksDB default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineSettings {
    pub allow_mmap_reads: Option<bool>,
    pub write_buffer_size: Option<usize>,
    pub max_bytes_for_level_base: Option<u64>,
    pub target_file_size_base: Option<u64>,
    pub max_write_buffer_number: Option<i32>,
    pub max_background_compactions: Option<i32>,
    pub max_background_flushes: Option<i32>,
    pub max_background_jobs: Option<i32>,
    pub min_write_buffer_number_to_merge: Option<i32>,
    pub level_zero_file_num_compaction_trigger: Option<i32>,
    /// Memtable budget of the level-style compaction preset, if applied
    pub level_style_compaction_budget: Option<usize>,
    /// Thread count of the parallelism preset, if applied
    pub parallelism: Option<i32>,
}

// ============================================================================
// Block-based table
// ============================================================================

/// Layout of the bloom filter blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFormat {
    /// One filter per SST file (RocksDB default)
    Full,
    /// One filter per data block (legacy block-based builder)
    BlockBased,
}

/// Bloom filter policy attached to a block-based table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomFilter {
    pub bits_per_key: u64,
    pub format: FilterFormat,
}

/// Block-based table settings, always backed by the shared cache.
#[derive(Debug, Clone)]
pub struct BlockTable {
    cache: SharedCache,
    pub block_size: Option<usize>,
    pub bloom_filter: Option<BloomFilter>,
}

impl BlockTable {
    pub fn new(cache: SharedCache) -> Self {
        Self {
            cache,
            block_size: None,
            bloom_filter: None,
        }
    }

    /// The block cache this table reads through.
    pub fn block_cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Build the native table options.
    pub fn to_block_based_options(&self) -> BlockBasedOptions {
        let mut table = BlockBasedOptions::default();
        table.set_block_cache(self.cache.rocksdb_cache());
        if let Some(block_size) = self.block_size {
            table.set_block_size(block_size);
        }
        if let Some(filter) = self.bloom_filter {
            table.set_bloom_filter(
                filter.bits_per_key as f64,
                filter.format == FilterFormat::BlockBased,
            );
        }
        table
    }
}

// ============================================================================
// EngineOptions
// ============================================================================

/// RocksDB options for one index, plus what was configured on them.
pub struct EngineOptions {
    native: Options,
    settings: EngineSettings,
    table: Option<BlockTable>,
    unknown: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineOptions {
    /// Options starting from RocksDB defaults.
    pub fn new() -> Self {
        Self {
            native: Options::default(),
            settings: EngineSettings::default(),
            table: None,
            unknown: Vec::new(),
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The attached block-based table, if one was configured.
    pub fn block_table(&self) -> Option<&BlockTable> {
        self.table.as_ref()
    }

    /// Option keys that were skipped because no applier is registered.
    pub fn unknown_options(&self) -> &[String] {
        &self.unknown
    }

    /// The native options.
    pub fn rocksdb(&self) -> &Options {
        &self.native
    }

    /// Mutable access for settings this crate does not manage (paths, create flags).
    pub fn rocksdb_mut(&mut self) -> &mut Options {
        &mut self.native
    }

    /// Consume into the native options, ready for `DB::open`.
    pub fn into_rocksdb(self) -> Options {
        self.native
    }

    // =========================================================================
    // Scalar settings
    // =========================================================================

    pub fn set_allow_mmap_reads(&mut self, enabled: bool) {
        self.native.set_allow_mmap_reads(enabled);
        self.settings.allow_mmap_reads = Some(enabled);
    }

    pub fn set_write_buffer_size(&mut self, size: usize) {
        self.native.set_write_buffer_size(size);
        self.settings.write_buffer_size = Some(size);
    }

    pub fn set_max_bytes_for_level_base(&mut self, size: u64) {
        self.native.set_max_bytes_for_level_base(size);
        self.settings.max_bytes_for_level_base = Some(size);
    }

    pub fn set_target_file_size_base(&mut self, size: u64) {
        self.native.set_target_file_size_base(size);
        self.settings.target_file_size_base = Some(size);
    }

    pub fn set_max_write_buffer_number(&mut self, n: i32) {
        self.native.set_max_write_buffer_number(n);
        self.settings.max_write_buffer_number = Some(n);
    }

    #[allow(deprecated)]
    pub fn set_max_background_compactions(&mut self, n: i32) {
        self.native.set_max_background_compactions(n);
        self.settings.max_background_compactions = Some(n);
    }

    #[allow(deprecated)]
    pub fn set_max_background_flushes(&mut self, n: i32) {
        self.native.set_max_background_flushes(n);
        self.settings.max_background_flushes = Some(n);
    }

    pub fn set_min_write_buffer_number_to_merge(&mut self, n: i32) {
        self.native.set_min_write_buffer_number_to_merge(n);
        self.settings.min_write_buffer_number_to_merge = Some(n);
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Tune for level-style compaction within `memtable_memory_budget` bytes.
    ///
    /// Overwrites write buffer sizing, buffer counts, level-0 trigger, target
    /// file size and level base size, including values set earlier.
    pub fn optimize_level_style_compaction(&mut self, memtable_memory_budget: usize) {
        self.native
            .optimize_level_style_compaction(memtable_memory_budget);

        // Mirrors RocksDB's ColumnFamilyOptions::OptimizeLevelStyleCompaction.
        let budget = memtable_memory_budget as u64;
        let s = &mut self.settings;
        s.write_buffer_size = Some(memtable_memory_budget / 4);
        s.min_write_buffer_number_to_merge = Some(2);
        s.max_write_buffer_number = Some(6);
        s.level_zero_file_num_compaction_trigger = Some(2);
        s.target_file_size_base = Some(budget / 8);
        s.max_bytes_for_level_base = Some(budget);
        s.level_style_compaction_budget = Some(memtable_memory_budget);
    }

    /// Size the background thread pools for `total_threads`.
    pub fn increase_parallelism(&mut self, total_threads: i32) {
        self.native.increase_parallelism(total_threads);
        self.settings.max_background_jobs = Some(total_threads);
        self.settings.parallelism = Some(total_threads);
    }

    // =========================================================================
    // Nested objects
    // =========================================================================

    /// Install a block-based table factory, replacing any earlier one.
    pub fn set_block_table(&mut self, table: BlockTable) {
        self.native
            .set_block_based_table_factory(&table.to_block_based_options());
        self.table = Some(table);
    }

    pub(crate) fn record_unknown(&mut self, key: &str) {
        self.unknown.push(key.to_string());
    }
}

impl std::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("settings", &self.settings)
            .field("table", &self.table)
            .field("unknown", &self.unknown)
            .finish_non_exhaustive()
    }
}
