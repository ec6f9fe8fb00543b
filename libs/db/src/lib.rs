//! Layered index configuration resolved into RocksDB options.
//!
//! A configuration document carries a `global` scope (object count hint,
//! statistics flag, shared cache sizing), a `base` scope of default per-index
//! options, and optional per-index overlays. [`OptionsBuilder`] resolves the
//! scope active for an index type and applies each option through an
//! extensible [`OptionTable`], producing [`EngineOptions`] whose block-based
//! table reads through one [`SharedCache`].

pub mod document;
pub mod error;
pub mod options;
pub mod resolver;
pub mod rocksdb;

pub use document::{ConfigSource, Object};
pub use error::{ConfigError, ConfigResult};
pub use options::{
    gather_statistics, object_count, ApplyContext, OptionApplier, OptionTable, OptionsBuilder,
    StandardOption,
};
pub use resolver::{active_scope, global_scope, index_name, merge, BASE, GLOBAL};
pub use crate::rocksdb::{
    BlockTable, BloomFilter, EngineOptions, EngineSettings, FilterFormat, SharedCache,
    SharedCacheConfig, SharedCacheSlot,
};
