//! Configuration source and typed access to document values.
//!
//! The document model is `serde_json::Value`. Any serde format that
//! deserializes into it (JSON, YAML, TOML, ...) can feed the resolver.
//! Helpers here separate presence checks (plain `Option` lookups on the map)
//! from kind checks, which fail with `ConfigError`.

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

/// A JSON object as used for scopes.
pub type Object = Map<String, Value>;

/// Name used for the document root in diagnostics.
pub const ROOT: &str = "indices";

// ============================================================================
// ConfigSource
// ============================================================================

/// Configuration handed to the builder by the storage layer.
///
/// Callers that hold the configuration for many subsystems pass this value
/// through without depending on the document model directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfigSource {
    /// No configuration was supplied
    #[default]
    Unset,
    /// A structured configuration document
    Document(Value),
}

impl ConfigSource {
    /// The root object of the document.
    ///
    /// Fails with `MissingScope` when unset and `InvalidShape` when the
    /// document is not an object.
    pub fn root(&self) -> ConfigResult<&Object> {
        match self {
            ConfigSource::Unset => Err(ConfigError::missing_scope(ROOT)),
            ConfigSource::Document(value) => expect_object(ROOT, value),
        }
    }
}

impl From<Value> for ConfigSource {
    fn from(value: Value) -> Self {
        ConfigSource::Document(value)
    }
}

// ============================================================================
// Typed extraction
// ============================================================================

/// Describe the kind of a value for error messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_u64() => "an unsigned integer",
        Value::Number(n) if n.is_i64() => "a negative integer",
        Value::Number(_) => "a floating point number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn expect_object<'a>(key: &str, value: &'a Value) -> ConfigResult<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| ConfigError::invalid_shape(key, "an object", describe(value)))
}

pub(crate) fn expect_bool(key: &str, value: &Value) -> ConfigResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| ConfigError::type_mismatch(key, "a boolean", describe(value)))
}

pub(crate) fn expect_u64(key: &str, value: &Value) -> ConfigResult<u64> {
    value
        .as_u64()
        .ok_or_else(|| ConfigError::type_mismatch(key, "an unsigned integer", describe(value)))
}

pub(crate) fn expect_usize(key: &str, value: &Value) -> ConfigResult<usize> {
    let n = expect_u64(key, value)?;
    usize::try_from(n).map_err(|_| {
        ConfigError::type_mismatch(key, "an unsigned integer", format!("{n}, which exceeds usize"))
    })
}

pub(crate) fn expect_i32(key: &str, value: &Value) -> ConfigResult<i32> {
    if let Some(n) = value.as_u64().filter(|&n| n > i64::MAX as u64) {
        let found = format!("{n}, which exceeds i32");
        return Err(ConfigError::type_mismatch(key, "an integer", found));
    }
    let n = value
        .as_i64()
        .ok_or_else(|| ConfigError::type_mismatch(key, "an integer", describe(value)))?;
    i32::try_from(n).map_err(|_| {
        ConfigError::type_mismatch(key, "an integer", format!("{n}, which exceeds i32"))
    })
}
