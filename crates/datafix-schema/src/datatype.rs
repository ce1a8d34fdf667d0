//! Resolved types and the dynamic decode/encode engine over templates.
//!
//! `decode` validates a tree value against a template, supplies optional
//! defaults, and drops unreadable list elements with warnings. `encode`
//! re-emits the value in template order: record fields first, in declaration
//! order, with unconsumed entries re-emitted at the `Remainder` position in
//! their original order. Entries outside the template with no remainder to
//! catch them are dropped.

use datafix_tree::{DataError, DataResult, Dynamic, TreeOps};

use crate::schema::Schema;
use crate::template::TypeTemplate;
use crate::types::TypeRef;

/// A template together with the reference it was resolved under, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    reference: Option<TypeRef>,
    template: TypeTemplate,
}

impl DataType {
    /// A type not bound to any reference (e.g. an inner template position).
    pub fn unnamed(template: TypeTemplate) -> Self {
        Self {
            reference: None,
            template,
        }
    }

    /// A type resolved from a schema binding.
    pub fn named(reference: TypeRef, template: TypeTemplate) -> Self {
        Self {
            reference: Some(reference),
            template,
        }
    }

    pub fn reference(&self) -> Option<&TypeRef> {
        self.reference.as_ref()
    }

    pub fn template(&self) -> &TypeTemplate {
        &self.template
    }

    /// Validates and normalizes `dynamic` against this type.
    ///
    /// Missing optional fields gain their defaults; unreadable list elements
    /// are dropped with warnings; missing required fields and unknown choice
    /// tags are hard errors.
    pub fn decode<O: TreeOps>(&self, schema: &Schema, dynamic: &Dynamic<O>) -> DataResult<Typed<O>> {
        read_value(&self.template, schema, dynamic.ops(), dynamic.value()).map(|value| Typed {
            data_type: self.clone(),
            dynamic: Dynamic::new(dynamic.ops().clone(), value),
        })
    }

    /// Re-emits `dynamic` in this type's template order. Unrelated entries
    /// survive through `Remainder` positions.
    pub fn encode<O: TreeOps>(
        &self,
        schema: &Schema,
        dynamic: &Dynamic<O>,
    ) -> DataResult<Dynamic<O>> {
        write_value(&self.template, schema, dynamic.ops(), dynamic.value())
            .map(|value| Dynamic::new(dynamic.ops().clone(), value))
    }
}

/// A normalized tree value bundled with its static type.
pub struct Typed<O: TreeOps> {
    data_type: DataType,
    dynamic: Dynamic<O>,
}

impl<O: TreeOps> Typed<O> {
    pub fn new(data_type: DataType, dynamic: Dynamic<O>) -> Self {
        Self { data_type, dynamic }
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn dynamic(&self) -> &Dynamic<O> {
        &self.dynamic
    }

    pub fn into_dynamic(self) -> Dynamic<O> {
        self.dynamic
    }

    /// The same type over a new value.
    pub fn with_value(&self, value: O::Value) -> Self {
        Self {
            data_type: self.data_type.clone(),
            dynamic: Dynamic::new(self.dynamic.ops().clone(), value),
        }
    }

    /// A different type over a new value (for rules that rewrite the type).
    pub fn retyped(&self, data_type: DataType, value: O::Value) -> Self {
        Self {
            data_type,
            dynamic: Dynamic::new(self.dynamic.ops().clone(), value),
        }
    }
}

impl<O: TreeOps> Clone for Typed<O> {
    fn clone(&self) -> Self {
        Self {
            data_type: self.data_type.clone(),
            dynamic: self.dynamic.clone(),
        }
    }
}

impl<O: TreeOps> PartialEq for Typed<O> {
    fn eq(&self, other: &Self) -> bool {
        self.data_type == other.data_type && self.dynamic == other.dynamic
    }
}

impl<O: TreeOps> std::fmt::Debug for Typed<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typed")
            .field("type", &self.data_type.reference)
            .field("value", self.dynamic.value())
            .finish()
    }
}

fn mismatch<V: std::fmt::Debug>(expected: &'static str, found: &V) -> DataError {
    DataError::TypeMismatch {
        expected,
        found: format!("{found:?}"),
    }
}

fn read_integral<O: TreeOps>(
    ops: &O,
    value: &O::Value,
    expected: &'static str,
    min: f64,
    max: f64,
) -> DataResult<O::Value> {
    ops.as_number(value).and_then(|n| {
        if n.fract() != 0.0 || n < min || n > max {
            DataResult::error(mismatch(expected, value))
        } else {
            DataResult::ok(value.clone())
        }
    })
}

/// Validates `value` against `template`, producing the normalized value.
pub(crate) fn read_value<O: TreeOps>(
    template: &TypeTemplate,
    schema: &Schema,
    ops: &O,
    value: &O::Value,
) -> DataResult<O::Value> {
    match template {
        TypeTemplate::Bool => {
            if ops.is_bool(value) {
                DataResult::ok(value.clone())
            } else {
                DataResult::error(mismatch("bool", value))
            }
        }
        TypeTemplate::I8 => read_integral(ops, value, "i8", i8::MIN as f64, i8::MAX as f64),
        TypeTemplate::I16 => read_integral(ops, value, "i16", i16::MIN as f64, i16::MAX as f64),
        TypeTemplate::I32 => read_integral(ops, value, "i32", i32::MIN as f64, i32::MAX as f64),
        TypeTemplate::I64 => read_integral(ops, value, "i64", i64::MIN as f64, i64::MAX as f64),
        TypeTemplate::F32 | TypeTemplate::F64 => {
            if ops.is_number(value) {
                DataResult::ok(value.clone())
            } else {
                DataResult::error(mismatch("number", value))
            }
        }
        TypeTemplate::Str => {
            if ops.is_string(value) {
                DataResult::ok(value.clone())
            } else {
                DataResult::error(mismatch("string", value))
            }
        }
        TypeTemplate::Empty => {
            if ops.is_null(value) {
                DataResult::ok(value.clone())
            } else {
                DataResult::error(mismatch("empty", value))
            }
        }
        TypeTemplate::Field { name, value: inner } => {
            if !ops.is_map(value) {
                return DataResult::error(mismatch("map", value));
            }
            match ops.get(value, name) {
                None => DataResult::error(DataError::FieldMissing(name.clone())),
                Some(entry) => read_value(inner, schema, ops, &entry)
                    .map(|normalized| ops.set(value, name, normalized)),
            }
        }
        TypeTemplate::Optional {
            name,
            value: inner,
            default,
        } => {
            if !ops.is_map(value) {
                return DataResult::error(mismatch("map", value));
            }
            match ops.get(value, name) {
                None => DataResult::ok(ops.set(value, name, default.build(ops))),
                Some(entry) => match read_value(inner, schema, ops, &entry) {
                    DataResult::Err(e) => DataResult::partial(
                        ops.set(value, name, default.build(ops)),
                        vec![format!("optional field '{name}': {e}")],
                    ),
                    other => other.map(|normalized| ops.set(value, name, normalized)),
                },
            }
        }
        TypeTemplate::List(element) => ops.list_items(value).and_then(|items| {
            let mut normalized = Vec::with_capacity(items.len());
            let mut warnings = Vec::new();
            for (index, item) in items.iter().enumerate() {
                match read_value(element, schema, ops, item) {
                    DataResult::Ok(v) => normalized.push(v),
                    DataResult::Partial { value, errors } => {
                        warnings.extend(errors);
                        normalized.push(value);
                    }
                    DataResult::Err(e) => {
                        warnings.push(format!("skipping list element {index}: {e}"));
                    }
                }
            }
            DataResult::partial(ops.create_list(normalized), warnings)
        }),
        TypeTemplate::And(parts) => {
            if !ops.is_map(value) {
                return DataResult::error(mismatch("map", value));
            }
            let mut acc = value.clone();
            let mut warnings = Vec::new();
            for part in parts {
                if matches!(part, TypeTemplate::Remainder) {
                    continue;
                }
                match read_value(part, schema, ops, &acc) {
                    DataResult::Ok(next) => acc = next,
                    DataResult::Partial { value, errors } => {
                        warnings.extend(errors);
                        acc = value;
                    }
                    DataResult::Err(e) => return DataResult::Err(e),
                }
            }
            DataResult::partial(acc, warnings)
        }
        TypeTemplate::Choice {
            tag_field,
            variants,
        } => match resolve_choice_variant(ops, value, tag_field, variants) {
            Err(e) => DataResult::Err(e),
            Ok((_, body)) => read_value(body, schema, ops, value),
        },
        TypeTemplate::Ref(reference) => DataResult::from(schema.get_type(reference))
            .and_then(|data_type| read_value(data_type.template(), schema, ops, value)),
        TypeTemplate::Remainder => DataResult::ok(value.clone()),
    }
}

/// Re-emits `value` in template order.
pub(crate) fn write_value<O: TreeOps>(
    template: &TypeTemplate,
    schema: &Schema,
    ops: &O,
    value: &O::Value,
) -> DataResult<O::Value> {
    match template {
        TypeTemplate::Bool
        | TypeTemplate::I8
        | TypeTemplate::I16
        | TypeTemplate::I32
        | TypeTemplate::I64
        | TypeTemplate::F32
        | TypeTemplate::F64
        | TypeTemplate::Str
        | TypeTemplate::Empty
        | TypeTemplate::Remainder => read_value(template, schema, ops, value),
        TypeTemplate::Field { name, value: inner } => {
            if !ops.is_map(value) {
                return DataResult::error(mismatch("map", value));
            }
            match ops.get(value, name) {
                None => DataResult::error(DataError::FieldMissing(name.clone())),
                Some(entry) => write_value(inner, schema, ops, &entry)
                    .map(|written| ops.set(value, name, written)),
            }
        }
        TypeTemplate::Optional {
            name,
            value: inner,
            default,
        } => {
            if !ops.is_map(value) {
                return DataResult::error(mismatch("map", value));
            }
            match ops.get(value, name) {
                None => DataResult::ok(ops.set(value, name, default.build(ops))),
                Some(entry) => match write_value(inner, schema, ops, &entry) {
                    DataResult::Err(e) => DataResult::partial(
                        ops.set(value, name, default.build(ops)),
                        vec![format!("optional field '{name}': {e}")],
                    ),
                    other => other.map(|written| ops.set(value, name, written)),
                },
            }
        }
        TypeTemplate::List(element) => ops.list_items(value).and_then(|items| {
            let mut written = Vec::with_capacity(items.len());
            let mut warnings = Vec::new();
            for (index, item) in items.iter().enumerate() {
                match write_value(element, schema, ops, item) {
                    DataResult::Ok(v) => written.push(v),
                    DataResult::Partial { value, errors } => {
                        warnings.extend(errors);
                        written.push(value);
                    }
                    DataResult::Err(e) => {
                        warnings.push(format!("skipping list element {index}: {e}"));
                    }
                }
            }
            DataResult::partial(ops.create_list(written), warnings)
        }),
        TypeTemplate::And(parts) => {
            if !ops.is_map(value) {
                return DataResult::error(mismatch("map", value));
            }
            write_record(parts, &[], ops.empty_map(), schema, ops, value)
        }
        TypeTemplate::Choice {
            tag_field,
            variants,
        } => {
            let (tag, body) = match resolve_choice_variant(ops, value, tag_field, variants) {
                Err(e) => return DataResult::Err(e),
                Ok(found) => found,
            };
            let base = match ops
                .merge_to_map(&ops.empty_map(), ops.string(tag_field), ops.string(&tag))
                .into_result()
            {
                Ok(map) => map,
                Err(e) => return DataResult::Err(e),
            };
            let parts = match body {
                TypeTemplate::And(parts) => parts.as_slice(),
                // validate() guarantees variant bodies are `And`
                _ => {
                    return DataResult::error(DataError::Codec(format!(
                        "choice variant '{tag}' is not a record body"
                    )))
                }
            };
            write_record(parts, &[tag_field.as_str()], base, schema, ops, value)
        }
        TypeTemplate::Ref(reference) => DataResult::from(schema.get_type(reference))
            .and_then(|data_type| write_value(data_type.template(), schema, ops, value)),
    }
}

/// Reads the tag field of a choice and looks up its variant body.
fn resolve_choice_variant<'t, O: TreeOps>(
    ops: &O,
    value: &O::Value,
    tag_field: &str,
    variants: &'t [(String, TypeTemplate)],
) -> Result<(String, &'t TypeTemplate), DataError> {
    if !ops.is_map(value) {
        return Err(mismatch("map", value));
    }
    let tag_value = ops
        .get(value, tag_field)
        .ok_or_else(|| DataError::FieldMissing(tag_field.to_string()))?;
    let tag = ops
        .as_string(&tag_value)
        .into_result()
        .map_err(|_| mismatch("string tag", &tag_value))?;
    match variants.iter().find(|(t, _)| *t == tag) {
        Some((_, body)) => Ok((tag, body)),
        None => Err(DataError::Codec(format!(
            "unknown variant tag '{tag}' in field '{tag_field}'"
        ))),
    }
}

/// Re-emits record parts in declaration order over a base map, re-emitting
/// unconsumed source entries at the remainder position.
fn write_record<O: TreeOps>(
    parts: &[TypeTemplate],
    extra_consumed: &[&str],
    base: O::Value,
    schema: &Schema,
    ops: &O,
    source: &O::Value,
) -> DataResult<O::Value> {
    let consumed: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.consumed_key())
        .chain(extra_consumed.iter().copied())
        .collect();

    let mut acc = base;
    let mut warnings = Vec::new();

    for part in parts {
        match part {
            TypeTemplate::Field { name, value: inner } => match ops.get(source, name) {
                None => return DataResult::error(DataError::FieldMissing(name.clone())),
                Some(entry) => match write_value(inner, schema, ops, &entry) {
                    DataResult::Ok(written) => match merge_entry(ops, acc, name, written) {
                        Ok(next) => acc = next,
                        Err(e) => return DataResult::Err(e),
                    },
                    DataResult::Partial {
                        value: written,
                        errors,
                    } => {
                        warnings.extend(errors);
                        match merge_entry(ops, acc, name, written) {
                            Ok(next) => acc = next,
                            Err(e) => return DataResult::Err(e),
                        }
                    }
                    DataResult::Err(e) => return DataResult::Err(e),
                },
            },
            TypeTemplate::Optional {
                name,
                value: inner,
                default,
            } => {
                let written = match ops.get(source, name) {
                    None => default.build(ops),
                    Some(entry) => match write_value(inner, schema, ops, &entry) {
                        DataResult::Ok(w) => w,
                        DataResult::Partial { value: w, errors } => {
                            warnings.extend(errors);
                            w
                        }
                        DataResult::Err(e) => {
                            warnings.push(format!("optional field '{name}': {e}"));
                            default.build(ops)
                        }
                    },
                };
                match merge_entry(ops, acc, name, written) {
                    Ok(next) => acc = next,
                    Err(e) => return DataResult::Err(e),
                }
            }
            TypeTemplate::Remainder => {
                let entries = match ops.map_entries(source).into_result() {
                    Ok(entries) => entries,
                    Err(e) => return DataResult::Err(e),
                };
                for (key, entry) in entries {
                    let key = match ops.as_string(&key).into_result() {
                        Ok(k) => k,
                        Err(_) => continue,
                    };
                    if consumed.contains(&key.as_str()) {
                        continue;
                    }
                    match merge_entry(ops, acc, &key, entry) {
                        Ok(next) => acc = next,
                        Err(e) => return DataResult::Err(e),
                    }
                }
            }
            other => {
                return DataResult::error(DataError::Codec(format!(
                    "invalid record part {other:?}"
                )))
            }
        }
    }

    DataResult::partial(acc, warnings)
}

fn merge_entry<O: TreeOps>(
    ops: &O,
    map: O::Value,
    key: &str,
    value: O::Value,
) -> Result<O::Value, DataError> {
    ops.merge_to_map(&map, ops.string(key), value).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::template::Constant;
    use crate::types::DataVersion;
    use datafix_formats::JsonOps;
    use serde_json::json;

    fn player_template() -> TypeTemplate {
        TypeTemplate::and(vec![
            TypeTemplate::field("name", TypeTemplate::Str),
            TypeTemplate::Remainder,
        ])
    }

    fn schema_v1() -> std::sync::Arc<Schema> {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(TypeRef::new("player"), player_template())
            .unwrap();
        builder.build()
    }

    fn dynamic(value: serde_json::Value) -> Dynamic<JsonOps> {
        Dynamic::new(JsonOps, value)
    }

    #[test]
    fn test_decode_validates_fields() {
        let schema = schema_v1();
        let data_type = schema.get_type(&TypeRef::new("player")).unwrap();
        let typed = data_type
            .decode(&schema, &dynamic(json!({"name": "Steve", "xp": 1500})))
            .into_result()
            .unwrap();
        assert_eq!(typed.dynamic().value(), &json!({"name": "Steve", "xp": 1500}));
    }

    #[test]
    fn test_decode_missing_required_field_is_hard() {
        let schema = schema_v1();
        let data_type = schema.get_type(&TypeRef::new("player")).unwrap();
        let result = data_type.decode(&schema, &dynamic(json!({"xp": 1})));
        assert_eq!(
            result.err(),
            Some(&DataError::FieldMissing("name".to_string()))
        );
    }

    #[test]
    fn test_decode_fills_optional_default() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(
                TypeRef::new("service"),
                TypeTemplate::and(vec![
                    TypeTemplate::field("name", TypeTemplate::Str),
                    TypeTemplate::optional_field("timeout", TypeTemplate::I32, Constant::I32(30)),
                ]),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("service")).unwrap();
        let typed = data_type
            .decode(&schema, &dynamic(json!({"name": "svc"})))
            .into_result()
            .unwrap();
        assert_eq!(
            typed.dynamic().value(),
            &json!({"name": "svc", "timeout": 30})
        );
    }

    #[test]
    fn test_encode_reorders_and_keeps_remainder_in_place() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(
                TypeRef::new("player"),
                TypeTemplate::and(vec![
                    TypeTemplate::field("name", TypeTemplate::Str),
                    TypeTemplate::field("experience", TypeTemplate::I32),
                    TypeTemplate::Remainder,
                ]),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("player")).unwrap();
        // fields out of template order, plus opaque entries
        let input = dynamic(json!({"xp_old": 1, "experience": 1500, "name": "Steve", "mods": ["a"]}));
        let encoded = data_type.encode(&schema, &input).into_result().unwrap();
        let keys: Vec<&str> = encoded
            .value()
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["name", "experience", "xp_old", "mods"]);
    }

    #[test]
    fn test_decode_list_drops_bad_elements_with_warning() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(
                TypeRef::new("scores"),
                TypeTemplate::and(vec![TypeTemplate::field(
                    "values",
                    TypeTemplate::list(TypeTemplate::I32),
                )]),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("scores")).unwrap();
        let result = data_type.decode(&schema, &dynamic(json!({"values": [3, "x", 7]})));
        match result {
            DataResult::Partial { value, errors } => {
                assert_eq!(value.dynamic().value(), &json!({"values": [3, 7]}));
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected partial, got {other:?}"),
        }
    }

    #[test]
    fn test_choice_read_and_write() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(
                TypeRef::new("entity"),
                TypeTemplate::choice(
                    "type",
                    vec![
                        (
                            "zombie_pigman",
                            TypeTemplate::and(vec![
                                TypeTemplate::field("angry", TypeTemplate::Bool),
                                TypeTemplate::Remainder,
                            ]),
                        ),
                        (
                            "creeper",
                            TypeTemplate::and(vec![TypeTemplate::Remainder]),
                        ),
                    ],
                ),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("entity")).unwrap();

        let input = dynamic(json!({"angry": true, "type": "zombie_pigman", "hp": 20}));
        let encoded = data_type.encode(&schema, &input).into_result().unwrap();
        // tag first, then variant fields, then remainder
        assert_eq!(
            encoded.value(),
            &json!({"type": "zombie_pigman", "angry": true, "hp": 20})
        );
    }

    #[test]
    fn test_choice_unknown_tag_is_hard() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(
                TypeRef::new("entity"),
                TypeTemplate::choice(
                    "type",
                    vec![("creeper", TypeTemplate::and(vec![TypeTemplate::Remainder]))],
                ),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("entity")).unwrap();
        let result = data_type.decode(&schema, &dynamic(json!({"type": "ghast"})));
        assert!(result.is_err());
    }

    #[test]
    fn test_ref_resolves_through_schema() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(TypeRef::new("player"), player_template())
            .unwrap();
        builder
            .register(
                TypeRef::new("world"),
                TypeTemplate::and(vec![
                    TypeTemplate::field(
                        "players",
                        TypeTemplate::list(TypeTemplate::reference("player")),
                    ),
                    TypeTemplate::Remainder,
                ]),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("world")).unwrap();
        let typed = data_type
            .decode(
                &schema,
                &dynamic(json!({"players": [{"name": "Steve"}, {"name": "Alex"}]})),
            )
            .into_result()
            .unwrap();
        assert_eq!(
            typed.dynamic().value(),
            &json!({"players": [{"name": "Steve"}, {"name": "Alex"}]})
        );
    }

    #[test]
    fn test_unresolved_ref_is_hard() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(
                TypeRef::new("world"),
                TypeTemplate::and(vec![TypeTemplate::field(
                    "owner",
                    TypeTemplate::reference("player"),
                )]),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("world")).unwrap();
        let result = data_type.decode(&schema, &dynamic(json!({"owner": {"name": "x"}})));
        assert_eq!(
            result.err(),
            Some(&DataError::UnresolvedType("player".to_string()))
        );
    }

    #[test]
    fn test_encode_without_remainder_drops_unknown_entries() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(
                TypeRef::new("point"),
                TypeTemplate::and(vec![
                    TypeTemplate::field("x", TypeTemplate::I32),
                    TypeTemplate::field("y", TypeTemplate::I32),
                ]),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("point")).unwrap();
        let encoded = data_type
            .encode(&schema, &dynamic(json!({"x": 1, "y": 2, "z": 3})))
            .into_result()
            .unwrap();
        assert_eq!(encoded.value(), &json!({"x": 1, "y": 2}));
    }
}
