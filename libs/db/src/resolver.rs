//! Scope resolution over a configuration document.
//!
//! A document has a `global` scope for process-wide settings, a `base` scope
//! holding default per-index options, and optional overlays keyed by index
//! name:
//!
//! ```text
//! {
//!   "global": { "object_count": 62000, "statistics": false, "shared_cache": {} },
//!   "base":   { "write_buffer_size": 1048576, "max_write_buffer_number": 4 },
//!   "accounts": { "write_buffer_size": 4194304 }
//! }
//! ```
//!
//! The active scope for index type `app::accounts` is `base` with the
//! `accounts` overlay written over it.
//!
//! # Shallow overlay
//!
//! Merging replaces whole values. When both base and overlay carry an object
//! under the same key (e.g. `block_based_table_options`), the overlay's object
//! wins outright and none of the base object's keys survive. Per-index table
//! settings rely on this whole-object replacement.

use std::borrow::Cow;

use serde_json::Value;

use crate::document::{expect_object, Object};
use crate::error::{ConfigError, ConfigResult};

/// Key of the process-wide scope.
pub const GLOBAL: &str = "global";

/// Key of the default per-index scope.
pub const BASE: &str = "base";

/// Merge `overlay` onto a copy of `base`.
///
/// Both values must be objects. Keys present in the overlay replace the base
/// value; other base keys are kept. Key order follows the base, with keys only
/// present in the overlay appended in overlay order.
pub fn merge(base: &Value, overlay: &Value) -> ConfigResult<Object> {
    overlay_onto(BASE, base, "overlay", overlay)
}

fn overlay_onto(
    base_name: &str,
    base: &Value,
    overlay_name: &str,
    overlay: &Value,
) -> ConfigResult<Object> {
    let base = expect_object(base_name, base)?;
    let overlay = expect_object(overlay_name, overlay)?;

    let mut config = base.clone();
    for (key, value) in overlay {
        config.insert(key.clone(), value.clone());
    }
    Ok(config)
}

/// The `global` scope of a document, verbatim.
pub fn global_scope(root: &Object) -> ConfigResult<&Object> {
    let global = root
        .get(GLOBAL)
        .ok_or_else(|| ConfigError::missing_scope(GLOBAL))?;
    expect_object(GLOBAL, global)
}

/// The lookup key for a possibly qualified type name.
///
/// Only the last colon-delimited segment is used, so `ns::accounts`,
/// `ns:accounts` and `accounts` all resolve to `accounts`.
pub fn index_name(type_name: &str) -> &str {
    type_name.rsplit(':').next().unwrap_or(type_name)
}

/// The configuration active for `type_name`.
///
/// Returns `base` merged with the overlay named by [`index_name`] when the
/// document has one, otherwise `base` itself, borrowed.
pub fn active_scope<'a>(root: &'a Object, type_name: &str) -> ConfigResult<Cow<'a, Object>> {
    let base = root.get(BASE).ok_or_else(|| ConfigError::missing_scope(BASE))?;
    let base_obj = expect_object(BASE, base)?;

    let name = index_name(type_name);
    match root.get(name) {
        Some(overlay) => {
            tracing::debug!(
                type_name,
                index = name,
                overlay_keys = overlay.as_object().map(|o| o.len()).unwrap_or(0),
                "Applying index configuration overlay"
            );
            overlay_onto(BASE, base, name, overlay).map(Cow::Owned)
        }
        None => Ok(Cow::Borrowed(base_obj)),
    }
}
