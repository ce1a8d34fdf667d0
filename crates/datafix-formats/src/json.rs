//! `TreeOps` over `serde_json::Value`.
//!
//! Built against `serde_json` with the `preserve_order` feature, so objects
//! keep insertion order on every read and round-trip. JSON `null` doubles as
//! the empty value. Integers map to the narrowest constructor that fits
//! (i32 when in range, else i64); non-finite floats are not representable in
//! JSON and surface as errors from the checked constructors.

use datafix_tree::{DataError, DataResult, TreeOps};
use serde_json::{Map, Number, Value};

/// `TreeOps` implementation for JSON trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOps;

fn mismatch(expected: &'static str, found: &Value) -> DataError {
    DataError::TypeMismatch {
        expected,
        found: found.to_string(),
    }
}

impl TreeOps for JsonOps {
    type Value = Value;

    fn empty(&self) -> Value {
        Value::Null
    }

    fn bool(&self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn i8(&self, value: i8) -> Value {
        Value::Number(Number::from(value))
    }

    fn i16(&self, value: i16) -> Value {
        Value::Number(Number::from(value))
    }

    fn i32(&self, value: i32) -> Value {
        Value::Number(Number::from(value))
    }

    fn i64(&self, value: i64) -> Value {
        Value::Number(Number::from(value))
    }

    /// Non-finite values fall back to null; use [`TreeOps::f32_checked`] to
    /// surface them as errors instead.
    fn f32(&self, value: f32) -> Value {
        Number::from_f64(value as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    fn f64(&self, value: f64) -> Value {
        Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    fn f32_checked(&self, value: f32) -> DataResult<Value> {
        match Number::from_f64(value as f64) {
            Some(n) => DataResult::ok(Value::Number(n)),
            None => DataResult::error(DataError::InvalidValue(format!(
                "JSON cannot represent {value}"
            ))),
        }
    }

    fn f64_checked(&self, value: f64) -> DataResult<Value> {
        match Number::from_f64(value) {
            Some(n) => DataResult::ok(Value::Number(n)),
            None => DataResult::error(DataError::InvalidValue(format!(
                "JSON cannot represent {value}"
            ))),
        }
    }

    fn string(&self, value: &str) -> Value {
        Value::String(value.to_string())
    }

    fn empty_list(&self) -> Value {
        Value::Array(Vec::new())
    }

    fn empty_map(&self) -> Value {
        Value::Object(Map::new())
    }

    fn is_null(&self, value: &Value) -> bool {
        value.is_null()
    }

    fn is_bool(&self, value: &Value) -> bool {
        value.is_boolean()
    }

    fn is_number(&self, value: &Value) -> bool {
        value.is_number()
    }

    fn is_string(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn is_list(&self, value: &Value) -> bool {
        value.is_array()
    }

    fn is_map(&self, value: &Value) -> bool {
        value.is_object()
    }

    fn as_bool(&self, value: &Value) -> DataResult<bool> {
        match value.as_bool() {
            Some(b) => DataResult::ok(b),
            None => DataResult::error(mismatch("bool", value)),
        }
    }

    fn as_number(&self, value: &Value) -> DataResult<f64> {
        match value.as_f64() {
            Some(n) => DataResult::ok(n),
            None => DataResult::error(mismatch("number", value)),
        }
    }

    fn as_string(&self, value: &Value) -> DataResult<String> {
        match value.as_str() {
            Some(s) => DataResult::ok(s.to_string()),
            None => DataResult::error(mismatch("string", value)),
        }
    }

    fn list_items(&self, value: &Value) -> DataResult<Vec<Value>> {
        match value.as_array() {
            Some(items) => DataResult::ok(items.clone()),
            None => DataResult::error(mismatch("list", value)),
        }
    }

    fn map_entries(&self, value: &Value) -> DataResult<Vec<(Value, Value)>> {
        match value.as_object() {
            Some(map) => DataResult::ok(
                map.iter()
                    .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                    .collect(),
            ),
            None => DataResult::error(mismatch("map", value)),
        }
    }

    fn get(&self, value: &Value, key: &str) -> Option<Value> {
        value.as_object().and_then(|map| map.get(key)).cloned()
    }

    fn merge_to_list(&self, list: &Value, element: Value) -> DataResult<Value> {
        match list {
            Value::Null => DataResult::ok(Value::Array(vec![element])),
            Value::Array(items) => {
                let mut items = items.clone();
                items.push(element);
                DataResult::ok(Value::Array(items))
            }
            other => DataResult::error(mismatch("list", other)),
        }
    }

    fn merge_to_map(&self, map: &Value, key: Value, value: Value) -> DataResult<Value> {
        let key = match key {
            Value::String(k) => k,
            other => return DataResult::error(mismatch("string key", &other)),
        };
        match map {
            Value::Null => {
                let mut object = Map::new();
                object.insert(key, value);
                DataResult::ok(Value::Object(object))
            }
            Value::Object(object) => {
                let mut object = object.clone();
                object.insert(key, value);
                DataResult::ok(Value::Object(object))
            }
            other => DataResult::error(mismatch("map", other)),
        }
    }

    fn create_list(&self, items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    fn create_map(&self, entries: Vec<(Value, Value)>) -> Value {
        let mut object = Map::new();
        for (k, v) in entries {
            if let Value::String(key) = k {
                object.insert(key, v);
            }
        }
        Value::Object(object)
    }

    fn set(&self, value: &Value, key: &str, entry: Value) -> Value {
        match value {
            Value::Object(object) => {
                let mut object = object.clone();
                object.insert(key.to_string(), entry);
                Value::Object(object)
            }
            _ => {
                let mut object = Map::new();
                object.insert(key.to_string(), entry);
                Value::Object(object)
            }
        }
    }

    fn remove(&self, value: &Value, key: &str) -> Value {
        match value {
            Value::Object(object) => {
                let mut object = object.clone();
                object.shift_remove(key);
                Value::Object(object)
            }
            other => other.clone(),
        }
    }
}
