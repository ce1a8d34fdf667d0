//! A tree value bundled with its ops.

use crate::ops::TreeOps;

/// A tree value paired with the [`TreeOps`] that knows how to work with it.
///
/// `Dynamic` is the unit the migration engine passes around: rules and
/// templates receive a `Dynamic` and go through its ops for every read and
/// edit. Values are immutable; every edit produces a new `Dynamic`.
pub struct Dynamic<O: TreeOps> {
    ops: O,
    value: O::Value,
}

impl<O: TreeOps> Dynamic<O> {
    pub fn new(ops: O, value: O::Value) -> Self {
        Self { ops, value }
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub fn value(&self) -> &O::Value {
        &self.value
    }

    pub fn into_value(self) -> O::Value {
        self.value
    }

    /// Produces a new `Dynamic` holding the result of `f`.
    pub fn map(&self, f: impl FnOnce(&O, &O::Value) -> O::Value) -> Self {
        Self {
            ops: self.ops.clone(),
            value: f(&self.ops, &self.value),
        }
    }

    /// Rebuilds this value in another format.
    pub fn convert_to<T: TreeOps>(&self, target: T) -> Dynamic<T> {
        let value = target.convert_from(&self.ops, &self.value);
        Dynamic { ops: target, value }
    }
}

impl<O: TreeOps> Clone for Dynamic<O> {
    fn clone(&self) -> Self {
        Self {
            ops: self.ops.clone(),
            value: self.value.clone(),
        }
    }
}

impl<O: TreeOps> PartialEq for Dynamic<O> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<O: TreeOps> std::fmt::Debug for Dynamic<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Dynamic").field(&self.value).finish()
    }
}
