//! Error types for configuration resolution and option dispatch.
//!
//! Leaf operations (resolver, dispatch, shared cache) return `ConfigError`
//! directly. The builder wraps it in `anyhow::Error` with the offending key and
//! type name attached; callers recover the kind with
//! `err.downcast_ref::<ConfigError>()`.

use thiserror::Error;

/// Convenience alias for leaf operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A configuration defect found while resolving scopes or applying options.
///
/// Every variant is fatal for the call that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value had the wrong structural kind (object expected, scalar found, ...)
    #[error("Expected '{key}' to be {expected}, found {found}")]
    InvalidShape {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A required top-level or nested scope is absent
    #[error("Missing required scope '{scope}'")]
    MissingScope { scope: String },

    /// A key required by a specific option or accessor is absent
    #[error("Expected '{scope}' to contain '{field}'")]
    MissingRequiredField { scope: String, field: String },

    /// A scalar is present but of the wrong kind or out of range
    #[error("Expected '{key}' to be {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid_shape(key: &str, expected: &'static str, found: &'static str) -> Self {
        ConfigError::InvalidShape {
            key: key.to_string(),
            expected,
            found,
        }
    }

    pub(crate) fn missing_scope(scope: &str) -> Self {
        ConfigError::MissingScope {
            scope: scope.to_string(),
        }
    }

    pub(crate) fn missing_field(scope: &str, field: &str) -> Self {
        ConfigError::MissingRequiredField {
            scope: scope.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn type_mismatch(key: &str, expected: &'static str, found: impl Into<String>) -> Self {
        ConfigError::TypeMismatch {
            key: key.to_string(),
            expected,
            found: found.into(),
        }
    }

    /// Short name of the error kind, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::InvalidShape { .. } => "invalid_shape",
            ConfigError::MissingScope { .. } => "missing_scope",
            ConfigError::MissingRequiredField { .. } => "missing_required_field",
            ConfigError::TypeMismatch { .. } => "type_mismatch",
        }
    }
}
