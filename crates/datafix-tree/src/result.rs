//! Three-state result type: ok, ok-with-warnings, or error.

use crate::error::DataError;

/// The propagation type for all codec, template, and rule operations.
///
/// `Partial` carries a usable value together with the messages describing
/// what was lost or skipped (e.g. list elements that failed to decode).
/// Warnings accumulate across `and_then` chains; a hard error discards the
/// value and aborts the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum DataResult<T> {
    /// Full success.
    Ok(T),
    /// Partial success: a usable value plus accumulated warnings.
    Partial { value: T, errors: Vec<String> },
    /// Hard failure.
    Err(DataError),
}

impl<T> DataResult<T> {
    /// Wraps a value as full success.
    pub fn ok(value: T) -> Self {
        DataResult::Ok(value)
    }

    /// Wraps an error.
    pub fn error(err: DataError) -> Self {
        DataResult::Err(err)
    }

    /// Wraps a value with warnings. Empty warnings collapse to `Ok`.
    pub fn partial(value: T, errors: Vec<String>) -> Self {
        if errors.is_empty() {
            DataResult::Ok(value)
        } else {
            DataResult::Partial { value, errors }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, DataResult::Ok(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, DataResult::Partial { .. })
    }

    pub fn is_err(&self) -> bool {
        matches!(self, DataResult::Err(_))
    }

    /// True for `Partial` and `Err`.
    pub fn has_errors(&self) -> bool {
        !self.is_ok()
    }

    /// The carried value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            DataResult::Ok(v) | DataResult::Partial { value: v, .. } => Some(v),
            DataResult::Err(_) => None,
        }
    }

    /// The accumulated warning messages (empty for `Ok` and `Err`).
    pub fn errors(&self) -> &[String] {
        match self {
            DataResult::Partial { errors, .. } => errors,
            _ => &[],
        }
    }

    /// The hard error, if any.
    pub fn err(&self) -> Option<&DataError> {
        match self {
            DataResult::Err(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the carried value, preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DataResult<U> {
        match self {
            DataResult::Ok(v) => DataResult::Ok(f(v)),
            DataResult::Partial { value, errors } => DataResult::Partial {
                value: f(value),
                errors,
            },
            DataResult::Err(e) => DataResult::Err(e),
        }
    }

    /// Chains a fallible step. Warnings from both sides accumulate; a hard
    /// error on either side wins.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> DataResult<U>) -> DataResult<U> {
        match self {
            DataResult::Ok(v) => f(v),
            DataResult::Partial { value, mut errors } => match f(value) {
                DataResult::Ok(u) => DataResult::Partial { value: u, errors },
                DataResult::Partial {
                    value: u,
                    errors: more,
                } => {
                    errors.extend(more);
                    DataResult::Partial { value: u, errors }
                }
                DataResult::Err(e) => DataResult::Err(e),
            },
            DataResult::Err(e) => DataResult::Err(e),
        }
    }

    /// Maps the hard error, leaving values and warnings untouched.
    pub fn map_err(self, f: impl FnOnce(DataError) -> DataError) -> DataResult<T> {
        match self {
            DataResult::Err(e) => DataResult::Err(f(e)),
            other => other,
        }
    }

    /// Appends one warning, promoting `Ok` to `Partial`.
    pub fn with_warning(self, message: impl Into<String>) -> DataResult<T> {
        self.with_warnings(vec![message.into()])
    }

    /// Appends warnings, promoting `Ok` to `Partial`. No-op on `Err`.
    pub fn with_warnings(self, mut messages: Vec<String>) -> DataResult<T> {
        if messages.is_empty() {
            return self;
        }
        match self {
            DataResult::Ok(value) => DataResult::Partial {
                value,
                errors: messages,
            },
            DataResult::Partial { value, mut errors } => {
                errors.append(&mut messages);
                DataResult::Partial { value, errors }
            }
            DataResult::Err(e) => DataResult::Err(e),
        }
    }

    /// Collapses to a standard `Result`, treating partial success as success.
    pub fn into_result(self) -> Result<T, DataError> {
        match self {
            DataResult::Ok(v) | DataResult::Partial { value: v, .. } => Ok(v),
            DataResult::Err(e) => Err(e),
        }
    }

    /// Collapses to a standard `Result`, treating partial success as failure.
    pub fn into_strict_result(self) -> Result<T, DataError> {
        match self {
            DataResult::Ok(v) => Ok(v),
            DataResult::Partial { errors, .. } => Err(DataError::Codec(errors.join("; "))),
            DataResult::Err(e) => Err(e),
        }
    }

    /// Applicative combination: both sides are evaluated, warnings merge,
    /// and hard errors aggregate their messages.
    pub fn apply2<U, R>(a: DataResult<T>, b: DataResult<U>, f: impl FnOnce(T, U) -> R) -> DataResult<R> {
        match (a, b) {
            (DataResult::Err(ea), DataResult::Err(eb)) => {
                DataResult::Err(DataError::Codec(format!("{ea}; {eb}")))
            }
            (DataResult::Err(e), _) | (_, DataResult::Err(e)) => DataResult::Err(e),
            (a, b) => {
                let mut warnings = a.errors().to_vec();
                warnings.extend(b.errors().iter().cloned());
                // both carry values here
                match (a.into_result(), b.into_result()) {
                    (Ok(va), Ok(vb)) => DataResult::partial(f(va, vb), warnings),
                    _ => unreachable!("non-error DataResult always carries a value"),
                }
            }
        }
    }
}

impl<T> From<Result<T, DataError>> for DataResult<T> {
    fn from(r: Result<T, DataError>) -> Self {
        match r {
            Ok(v) => DataResult::Ok(v),
            Err(e) => DataResult::Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_roundtrip() {
        let r = DataResult::ok(5);
        assert!(r.is_ok());
        assert_eq!(r.value(), Some(&5));
        assert_eq!(r.errors(), &[] as &[String]);
        assert_eq!(r.into_result(), Ok(5));
    }

    #[test]
    fn test_partial_collapses_when_empty() {
        let r = DataResult::partial(5, vec![]);
        assert!(r.is_ok());
    }

    #[test]
    fn test_partial_carries_value_and_errors() {
        let r = DataResult::partial(5, vec!["lost element".to_string()]);
        assert!(r.is_partial());
        assert_eq!(r.value(), Some(&5));
        assert_eq!(r.errors(), &["lost element".to_string()]);
        assert_eq!(r.into_result(), Ok(5));
    }

    #[test]
    fn test_strict_result_rejects_partial() {
        let r = DataResult::partial(5, vec!["lost".to_string()]);
        assert!(r.into_strict_result().is_err());
    }

    #[test]
    fn test_map_preserves_warnings() {
        let r = DataResult::partial(5, vec!["w".to_string()]).map(|v| v * 2);
        assert_eq!(r.value(), Some(&10));
        assert_eq!(r.errors().len(), 1);
    }

    #[test]
    fn test_and_then_accumulates_warnings() {
        let r = DataResult::partial(5, vec!["first".to_string()])
            .and_then(|v| DataResult::partial(v + 1, vec!["second".to_string()]));
        assert_eq!(r.value(), Some(&6));
        assert_eq!(r.errors(), &["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_and_then_error_wins() {
        let r = DataResult::partial(5, vec!["w".to_string()])
            .and_then(|_| DataResult::<i32>::error(DataError::FrozenMutation));
        assert!(r.is_err());
    }

    #[test]
    fn test_with_warning_promotes_ok() {
        let r = DataResult::ok(1).with_warning("careful");
        assert!(r.is_partial());
    }

    #[test]
    fn test_with_warning_noop_on_err() {
        let r = DataResult::<i32>::error(DataError::FrozenMutation).with_warning("ignored");
        assert!(r.is_err());
        assert_eq!(r.errors(), &[] as &[String]);
    }

    #[test]
    fn test_apply2_merges_values() {
        let r = DataResult::apply2(DataResult::ok(2), DataResult::ok(3), |a, b| a + b);
        assert_eq!(r, DataResult::Ok(5));
    }

    #[test]
    fn test_apply2_merges_warnings() {
        let r = DataResult::apply2(
            DataResult::partial(2, vec!["a".to_string()]),
            DataResult::partial(3, vec!["b".to_string()]),
            |a, b| a + b,
        );
        assert_eq!(r.value(), Some(&5));
        assert_eq!(r.errors(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_apply2_aggregates_errors() {
        let r: DataResult<i32> = DataResult::apply2(
            DataResult::<i32>::error(DataError::FieldMissing("x".to_string())),
            DataResult::<i32>::error(DataError::FieldMissing("y".to_string())),
            |a, b| a + b,
        );
        match r {
            DataResult::Err(DataError::Codec(msg)) => {
                assert!(msg.contains("'x'"));
                assert!(msg.contains("'y'"));
            }
            other => panic!("expected aggregated codec error, got {other:?}"),
        }
    }
}
