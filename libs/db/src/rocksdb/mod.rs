//! RocksDB option types populated from index configuration.
//!
//! # Ownership
//!
//! ```text
//! ┌──────────────────────────┐
//! │ OptionsBuilder           │ owns one SharedCacheSlot
//! │  └─ SharedCacheSlot ─────┼──► SharedCache (Arc, created once)
//! └──────────────────────────┘          ▲
//!                                       │ clone per index
//! ┌──────────────────────────┐          │
//! │ EngineOptions (per index)│          │
//! │  ├─ rocksdb::Options     │          │
//! │  ├─ EngineSettings       │          │
//! │  └─ BlockTable ──────────┼──────────┘
//! └──────────────────────────┘
//! ```

mod cache;
mod config;
mod options;

// Re-exports
pub use cache::{SharedCache, SharedCacheSlot};
pub use config::{
    SharedCacheConfig, CAPACITY, DEFAULT_CACHE_CAPACITY, DEFAULT_NUM_SHARD_BITS,
    MAX_NUM_SHARD_BITS, NUM_SHARD_BITS, SHARED_CACHE,
};
pub use options::{
    BlockTable, BloomFilter, EngineOptions, EngineSettings, FilterFormat,
    DEFAULT_MEMTABLE_MEMORY_BUDGET, DEFAULT_PARALLELISM,
};
