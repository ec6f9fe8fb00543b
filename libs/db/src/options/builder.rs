//! Builds per-index engine options and reads global parameters.
//!
//! # Example
//!
//! ```ignore
//! use lodestone_db::{ConfigSource, OptionsBuilder};
//!
//! let source = ConfigSource::from(serde_json::json!({
//!     "global": { "object_count": 62000, "statistics": false, "shared_cache": {} },
//!     "base":   { "write_buffer_size": 1048576 },
//!     "accounts": { "write_buffer_size": 4194304 }
//! }));
//!
//! let builder = OptionsBuilder::global();
//! let count = lodestone_db::object_count(&source)?;
//! let options = builder.build_options(&source, "app::accounts")?;
//! let db = rocksdb::DB::open(&options.into_rocksdb(), path)?;
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use serde_json::Value;

use super::dispatch::{ApplyContext, OptionTable};
use crate::document::{describe, ConfigSource, Object};
use crate::error::{ConfigError, ConfigResult};
use crate::resolver::{active_scope, global_scope, GLOBAL};
use crate::rocksdb::{EngineOptions, SharedCache, SharedCacheSlot};

/// Hint for the number of objects the process will hold.
pub const OBJECT_COUNT: &str = "object_count";
/// Whether engine statistics should be gathered.
pub const STATISTICS: &str = "statistics";

lazy_static! {
    static ref PROCESS_BUILDER: OptionsBuilder = OptionsBuilder::new();
}

// ============================================================================
// Global accessors
// ============================================================================

/// Read `global.object_count`.
pub fn object_count(source: &ConfigSource) -> Result<u64> {
    global_field(source, OBJECT_COUNT, |v| v.as_u64(), "an unsigned integer")
}

/// Read `global.statistics`.
pub fn gather_statistics(source: &ConfigSource) -> Result<bool> {
    global_field(source, STATISTICS, |v| v.as_bool(), "a boolean")
}

fn global_field<T>(
    source: &ConfigSource,
    field: &str,
    extract: impl Fn(&Value) -> Option<T>,
    expected: &'static str,
) -> Result<T> {
    let read = || -> ConfigResult<T> {
        let global = global_scope(source.root()?)?;
        let value = global
            .get(field)
            .ok_or_else(|| ConfigError::missing_field(GLOBAL, field))?;
        extract(value).ok_or_else(|| ConfigError::type_mismatch(field, expected, describe(value)))
    };

    read().map_err(|e| {
        tracing::error!(field, expected, kind = e.kind(), error = %e, "Error parsing global configuration");
        anyhow::Error::new(e).context(format!("reading global configuration field '{field}'"))
    })
}

// ============================================================================
// OptionsBuilder
// ============================================================================

/// Builds [`EngineOptions`] for index types from a shared configuration.
///
/// A builder owns the shared block cache: the first successful
/// [`build_options`](Self::build_options) (or [`ensure_cache`](Self::ensure_cache))
/// creates it from the `global` scope, and every table built afterwards reads
/// through that same cache. Use [`OptionsBuilder::global`] for one cache per
/// process, or a fresh builder for isolated use.
///
/// The builder is `Send + Sync`; index types may be configured concurrently.
#[derive(Debug)]
pub struct OptionsBuilder {
    shared_cache: SharedCacheSlot,
    table: Arc<OptionTable>,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsBuilder {
    /// A builder using the standard option table.
    pub fn new() -> Self {
        Self {
            shared_cache: SharedCacheSlot::new(),
            table: OptionTable::standard(),
        }
    }

    /// A builder using a custom option table.
    pub fn with_table(table: OptionTable) -> Self {
        Self {
            shared_cache: SharedCacheSlot::new(),
            table: Arc::new(table),
        }
    }

    /// The process-wide builder.
    pub fn global() -> &'static OptionsBuilder {
        &PROCESS_BUILDER
    }

    pub fn table(&self) -> &OptionTable {
        &self.table
    }

    /// The shared cache, if it has been created.
    pub fn shared_cache(&self) -> Option<&SharedCache> {
        self.shared_cache.get()
    }

    /// Return the shared cache, creating it from the `global` scope on first use.
    pub fn ensure_cache(&self, global: &Object) -> ConfigResult<SharedCache> {
        self.shared_cache.ensure(global)
    }

    /// Build engine options for `type_name`.
    ///
    /// Applies every key of the active scope in document order. Unknown keys
    /// are skipped with a warning and listed in
    /// [`EngineOptions::unknown_options`]. The first failing key aborts the
    /// build; the returned error keeps the originating [`ConfigError`].
    #[tracing::instrument(skip(self, source))]
    pub fn build_options(&self, source: &ConfigSource, type_name: &str) -> Result<EngineOptions> {
        self.try_build(source, type_name).map_err(|e| {
            tracing::error!(type_name, error = %format!("{e:#}"), "Error parsing configuration");
            e.context(format!("configuring index type '{type_name}'"))
        })
    }

    fn try_build(&self, source: &ConfigSource, type_name: &str) -> Result<EngineOptions> {
        let root = source.root()?;

        let cache = match self.shared_cache.get() {
            Some(cache) => cache.clone(),
            None => self.ensure_cache(global_scope(root)?)?,
        };
        let cx = ApplyContext::new(&cache);

        let config = active_scope(root, type_name)?;
        let mut options = EngineOptions::new();

        for (key, value) in config.iter() {
            let Some(applier) = self.table.get(key) else {
                tracing::warn!(type_name, key = key.as_str(), "Encountered an unknown option");
                options.record_unknown(key);
                continue;
            };

            applier.apply(&mut options, value, &cx).map_err(|e| {
                tracing::error!(
                    type_name,
                    key = key.as_str(),
                    value = %value,
                    kind = e.kind(),
                    error = %e,
                    "Error applying option"
                );
                anyhow::Error::new(e)
            })
            .with_context(|| format!("applying option '{key}'"))?;

            tracing::debug!(type_name, key = key.as_str(), value = %value, "Applied option");
        }

        Ok(options)
    }
}
