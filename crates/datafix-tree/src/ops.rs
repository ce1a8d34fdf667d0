//! The `TreeOps` trait: read, classify, build, and edit tree values.

use crate::error::DataError;
use crate::result::DataResult;

/// Format-agnostic operations over one serialization tree type.
///
/// This is the only surface through which the migration engine touches tree
/// values. A tree value is one of: null, boolean, integer (8/16/32/64),
/// float, double, string, ordered list, or ordered string-keyed mapping.
///
/// Implementations are small constructable value types (unit structs in
/// practice), passed by reference. All edits are copy-on-write: no operation
/// mutates its input, and no operation panics on user data.
pub trait TreeOps: Clone {
    /// The format-specific tree value.
    type Value: Clone + PartialEq + std::fmt::Debug;

    // ── Creation ──

    /// The null/empty value.
    fn empty(&self) -> Self::Value;
    fn bool(&self, value: bool) -> Self::Value;
    fn i8(&self, value: i8) -> Self::Value;
    fn i16(&self, value: i16) -> Self::Value;
    fn i32(&self, value: i32) -> Self::Value;
    fn i64(&self, value: i64) -> Self::Value;
    fn f32(&self, value: f32) -> Self::Value;
    fn f64(&self, value: f64) -> Self::Value;
    fn string(&self, value: &str) -> Self::Value;
    fn empty_list(&self) -> Self::Value;
    fn empty_map(&self) -> Self::Value;

    /// Builds a number using the narrowest constructor that fits:
    /// i32 when the value is integral and in range, else i64, else f64.
    fn numeric(&self, value: f64) -> Self::Value {
        if value.is_finite() && value.fract() == 0.0 {
            if value >= i32::MIN as f64 && value <= i32::MAX as f64 {
                return self.i32(value as i32);
            }
            if value >= i64::MIN as f64 && value <= i64::MAX as f64 {
                return self.i64(value as i64);
            }
        }
        self.f64(value)
    }

    /// Checked float creation. Strict formats override this to reject values
    /// they cannot represent (e.g. NaN).
    fn f32_checked(&self, value: f32) -> DataResult<Self::Value> {
        DataResult::ok(self.f32(value))
    }

    /// Checked double creation. See [`TreeOps::f32_checked`].
    fn f64_checked(&self, value: f64) -> DataResult<Self::Value> {
        DataResult::ok(self.f64(value))
    }

    // ── Classification ──

    fn is_null(&self, value: &Self::Value) -> bool;
    fn is_bool(&self, value: &Self::Value) -> bool;
    fn is_number(&self, value: &Self::Value) -> bool;
    fn is_string(&self, value: &Self::Value) -> bool;
    fn is_list(&self, value: &Self::Value) -> bool;
    fn is_map(&self, value: &Self::Value) -> bool;

    // ── Primitive reads ──

    fn as_bool(&self, value: &Self::Value) -> DataResult<bool>;
    fn as_number(&self, value: &Self::Value) -> DataResult<f64>;
    fn as_string(&self, value: &Self::Value) -> DataResult<String>;

    // ── List and map reads ──

    /// The list elements in order. Error if the value is not a list.
    fn list_items(&self, value: &Self::Value) -> DataResult<Vec<Self::Value>>;

    /// The map entries as `(key, value)` pairs, preserving insertion order
    /// where the underlying format does. Error if the value is not a map.
    fn map_entries(&self, value: &Self::Value) -> DataResult<Vec<(Self::Value, Self::Value)>>;

    /// The value under `key`, or `None` if absent or not a map.
    fn get(&self, value: &Self::Value, key: &str) -> Option<Self::Value>;

    fn has(&self, value: &Self::Value, key: &str) -> bool {
        self.get(value, key).is_some()
    }

    // ── Building ──

    /// Appends an element to a list. Null grows into a one-element list;
    /// a non-list input is an error.
    fn merge_to_list(&self, list: &Self::Value, element: Self::Value) -> DataResult<Self::Value>;

    /// Inserts an entry into a map. Null grows into a one-entry map; a
    /// non-string key or non-map input is an error.
    fn merge_to_map(
        &self,
        map: &Self::Value,
        key: Self::Value,
        value: Self::Value,
    ) -> DataResult<Self::Value>;

    /// Merges all entries of `other` into `map` (right-hand entries win on
    /// key collision). Null on either side behaves as an empty map.
    fn merge_maps(&self, map: &Self::Value, other: &Self::Value) -> DataResult<Self::Value> {
        if self.is_null(other) {
            return if self.is_null(map) {
                DataResult::ok(self.empty_map())
            } else if self.is_map(map) {
                DataResult::ok(map.clone())
            } else {
                DataResult::error(DataError::type_mismatch("map", map))
            };
        }
        self.map_entries(other).and_then(|entries| {
            let mut acc = if self.is_null(map) {
                self.empty_map()
            } else {
                map.clone()
            };
            for (k, v) in entries {
                match self.merge_to_map(&acc, k, v) {
                    DataResult::Ok(next) => acc = next,
                    DataResult::Partial { value, .. } => acc = value,
                    DataResult::Err(e) => return DataResult::error(e),
                }
            }
            DataResult::ok(acc)
        })
    }

    fn create_list(&self, items: Vec<Self::Value>) -> Self::Value;

    /// Builds a map from `(key, value)` pairs, keeping the given order.
    /// Non-string keys are skipped.
    fn create_map(&self, entries: Vec<(Self::Value, Self::Value)>) -> Self::Value;

    // ── Editing ──

    /// Returns a copy of `value` with `key` bound to `entry`. If `value` is
    /// not a map, the result is a new single-entry map.
    fn set(&self, value: &Self::Value, key: &str, entry: Self::Value) -> Self::Value;

    /// Returns a copy of `value` without `key`. A non-map input is returned
    /// unchanged.
    fn remove(&self, value: &Self::Value, key: &str) -> Self::Value;

    // ── Cross-format conversion ──

    /// Rebuilds a value from another format in this ops' format.
    /// Unknown or unreadable shapes become [`TreeOps::empty`].
    fn convert_from<S: TreeOps>(&self, source: &S, value: &S::Value) -> Self::Value {
        if source.is_bool(value) {
            return match source.as_bool(value).into_result() {
                Ok(b) => self.bool(b),
                Err(_) => self.empty(),
            };
        }
        if source.is_number(value) {
            return match source.as_number(value).into_result() {
                Ok(n) => self.numeric(n),
                Err(_) => self.empty(),
            };
        }
        if source.is_string(value) {
            return match source.as_string(value).into_result() {
                Ok(s) => self.string(&s),
                Err(_) => self.empty(),
            };
        }
        if source.is_list(value) {
            return match source.list_items(value).into_result() {
                Ok(items) => self.create_list(
                    items
                        .iter()
                        .map(|item| self.convert_from(source, item))
                        .collect(),
                ),
                Err(_) => self.empty(),
            };
        }
        if source.is_map(value) {
            return match source.map_entries(value).into_result() {
                Ok(entries) => self.create_map(
                    entries
                        .iter()
                        .map(|(k, v)| (self.convert_from(source, k), self.convert_from(source, v)))
                        .collect(),
                ),
                Err(_) => self.empty(),
            };
        }
        self.empty()
    }
}
