//! Error taxonomy for tree, codec, and migration operations.

use thiserror::Error;

/// Errors produced by tree operations, codecs, schemas, and migrations.
///
/// Errors are values, never control-flow exceptions: every fallible operation
/// in the workspace returns a [`crate::DataResult`] carrying one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A tree classification check failed (e.g. `as_string` on a list).
    /// Carries the offending value's string form.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    /// A type reference could not be resolved in the active schema chain.
    #[error("unresolved type reference '{0}'")]
    UnresolvedType(String),

    /// A required field expected by a codec or template was absent.
    #[error("missing required field '{0}'")]
    FieldMissing(String),

    /// A bounded codec saw an out-of-range value.
    #[error("Value {value} outside of range [{min}, {max}]")]
    RangeViolation {
        value: String,
        min: String,
        max: String,
    },

    /// Two schemas were registered at the same version.
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// A write was attempted on a frozen registry.
    #[error("registry is frozen; mutation rejected")]
    FrozenMutation,

    /// A format rejected a value on creation (e.g. NaN in a strict format).
    #[error("invalid value for format: {0}")]
    InvalidValue(String),

    /// Generic encode/decode failure with an accumulated message.
    #[error("codec error: {0}")]
    Codec(String),
}

impl DataError {
    /// Builds a `TypeMismatch` from the expected kind and the offending value.
    pub fn type_mismatch(expected: &'static str, found: impl std::fmt::Debug) -> Self {
        DataError::TypeMismatch {
            expected,
            found: format!("{found:?}"),
        }
    }

    /// Builds a `RangeViolation` with the canonical message shape.
    pub fn range_violation(
        value: impl std::fmt::Display,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
    ) -> Self {
        DataError::RangeViolation {
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_display() {
        let err = DataError::type_mismatch("string", 42);
        assert_eq!(err.to_string(), "type mismatch: expected string, found 42");
    }

    #[test]
    fn test_range_violation_display() {
        let err = DataError::range_violation(150, 0, 100);
        assert_eq!(err.to_string(), "Value 150 outside of range [0, 100]");
    }

    #[test]
    fn test_unresolved_type_display() {
        let err = DataError::UnresolvedType("player".to_string());
        assert_eq!(err.to_string(), "unresolved type reference 'player'");
    }

    #[test]
    fn test_frozen_mutation_display() {
        assert_eq!(
            DataError::FrozenMutation.to_string(),
            "registry is frozen; mutation rejected"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DataError>();
    }
}
