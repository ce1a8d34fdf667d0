//! Field-level rewrite primitives.
//!
//! Every primitive applies only to maps, preserves unrelated entries exactly,
//! and preserves insertion order — a renamed field keeps its position.

use datafix_schema::Typed;
use datafix_tree::{DataResult, Dynamic, TreeOps};

use super::{BoxRule, Rule};

/// Rebinds the value under `old` to `new`, iff `old` is present and `new`
/// is not. The entry keeps its position.
pub fn rename_field<O: TreeOps + 'static>(old: &str, new: &str) -> BoxRule<O> {
    Box::new(RenameField {
        name: format!("rename_field({old} -> {new})"),
        old: old.to_string(),
        new: new.to_string(),
    })
}

/// Drops the entry under `name` if present.
pub fn remove_field<O: TreeOps + 'static>(name: &str) -> BoxRule<O> {
    Box::new(RemoveField {
        rule_name: format!("remove_field({name})"),
        field: name.to_string(),
    })
}

/// Adds an entry under `name` built by `default`, iff absent. Never
/// overwrites.
pub fn add_field<O, F>(name: &str, default: F) -> BoxRule<O>
where
    O: TreeOps + 'static,
    F: Fn(&O) -> O::Value + Send + Sync + 'static,
{
    Box::new(AddField {
        rule_name: format!("add_field({name})"),
        field: name.to_string(),
        default,
    })
}

/// Maps the value under `name` through `f` if present; declines otherwise.
pub fn transform_field<O, F>(name: &str, f: F) -> BoxRule<O>
where
    O: TreeOps + 'static,
    F: Fn(&Dynamic<O>) -> DataResult<Dynamic<O>> + Send + Sync + 'static,
{
    Box::new(TransformField {
        rule_name: format!("transform_field({name})"),
        field: name.to_string(),
        f,
    })
}

struct RenameField {
    name: String,
    old: String,
    new: String,
}

impl<O: TreeOps> Rule<O> for RenameField {
    fn name(&self) -> &str {
        &self.name
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        let ops = typed.dynamic().ops();
        let value = typed.dynamic().value();
        if !ops.is_map(value) || !ops.has(value, &self.old) || ops.has(value, &self.new) {
            return None;
        }
        let entries = match ops.map_entries(value).into_result() {
            Ok(entries) => entries,
            Err(e) => return Some(DataResult::error(e)),
        };
        let renamed = entries
            .into_iter()
            .map(|(key, entry)| {
                let is_old = ops
                    .as_string(&key)
                    .into_result()
                    .map(|k| k == self.old)
                    .unwrap_or(false);
                if is_old {
                    (ops.string(&self.new), entry)
                } else {
                    (key, entry)
                }
            })
            .collect();
        Some(DataResult::ok(typed.with_value(ops.create_map(renamed))))
    }
}

struct RemoveField {
    rule_name: String,
    field: String,
}

impl<O: TreeOps> Rule<O> for RemoveField {
    fn name(&self) -> &str {
        &self.rule_name
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        let ops = typed.dynamic().ops();
        let value = typed.dynamic().value();
        if !ops.is_map(value) || !ops.has(value, &self.field) {
            return None;
        }
        Some(DataResult::ok(
            typed.with_value(ops.remove(value, &self.field)),
        ))
    }
}

struct AddField<F> {
    rule_name: String,
    field: String,
    default: F,
}

impl<O, F> Rule<O> for AddField<F>
where
    O: TreeOps,
    F: Fn(&O) -> O::Value + Send + Sync,
{
    fn name(&self) -> &str {
        &self.rule_name
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        let ops = typed.dynamic().ops();
        let value = typed.dynamic().value();
        if !ops.is_map(value) || ops.has(value, &self.field) {
            return None;
        }
        let entry = (self.default)(ops);
        Some(DataResult::ok(
            typed.with_value(ops.set(value, &self.field, entry)),
        ))
    }
}

struct TransformField<F> {
    rule_name: String,
    field: String,
    f: F,
}

impl<O, F> Rule<O> for TransformField<F>
where
    O: TreeOps,
    F: Fn(&Dynamic<O>) -> DataResult<Dynamic<O>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.rule_name
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        let ops = typed.dynamic().ops();
        let value = typed.dynamic().value();
        if !ops.is_map(value) {
            return None;
        }
        let entry = ops.get(value, &self.field)?;
        let transformed = (self.f)(&Dynamic::new(ops.clone(), entry));
        Some(transformed.map(|dynamic| {
            typed.with_value(ops.set(value, &self.field, dynamic.into_value()))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafix_formats::JsonOps;
    use datafix_schema::{DataType, TypeTemplate};
    use datafix_tree::DataError;
    use serde_json::json;

    fn typed(value: serde_json::Value) -> Typed<JsonOps> {
        Typed::new(
            DataType::unnamed(TypeTemplate::and(vec![TypeTemplate::Remainder])),
            Dynamic::new(JsonOps, value),
        )
    }

    fn rewritten(rule: &BoxRule<JsonOps>, value: serde_json::Value) -> serde_json::Value {
        rule.rewrite(&typed(value))
            .expect("rule should apply")
            .into_result()
            .expect("rule should succeed")
            .dynamic()
            .value()
            .clone()
    }

    #[test]
    fn test_rename_field_preserves_position_and_siblings() {
        let rule = rename_field("playerName", "name");
        let result = rewritten(&rule, json!({"playerName": "Steve", "xp": 1500}));
        assert_eq!(result, json!({"name": "Steve", "xp": 1500}));
        let keys: Vec<&str> = result.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "xp"]);
    }

    #[test]
    fn test_rename_field_declines_when_absent() {
        let rule: BoxRule<JsonOps> = rename_field("playerName", "name");
        assert!(rule.rewrite(&typed(json!({"xp": 1}))).is_none());
    }

    #[test]
    fn test_rename_field_declines_when_target_exists() {
        let rule: BoxRule<JsonOps> = rename_field("a", "b");
        assert!(rule.rewrite(&typed(json!({"a": 1, "b": 2}))).is_none());
    }

    #[test]
    fn test_rename_field_declines_on_non_map() {
        let rule: BoxRule<JsonOps> = rename_field("a", "b");
        assert!(rule.rewrite(&typed(json!([1, 2]))).is_none());
    }

    #[test]
    fn test_remove_field() {
        let rule = remove_field("junk");
        assert_eq!(
            rewritten(&rule, json!({"keep": 1, "junk": 2})),
            json!({"keep": 1})
        );
    }

    #[test]
    fn test_remove_field_declines_when_absent() {
        let rule: BoxRule<JsonOps> = remove_field("junk");
        assert!(rule.rewrite(&typed(json!({"keep": 1}))).is_none());
    }

    #[test]
    fn test_add_field_never_overwrites() {
        let rule = add_field("level", |ops: &JsonOps| ops.i32(1));
        assert_eq!(
            rewritten(&rule, json!({"name": "x"})),
            json!({"name": "x", "level": 1})
        );
        assert!(rule.rewrite(&typed(json!({"level": 9}))).is_none());
    }

    #[test]
    fn test_transform_field_maps_value() {
        let rule = transform_field("xp", |d: &Dynamic<JsonOps>| {
            let ops = d.ops().clone();
            ops.as_number(d.value())
                .map(move |n| Dynamic::new(ops.clone(), ops.i32((n * 2.0) as i32)))
        });
        assert_eq!(rewritten(&rule, json!({"xp": 10})), json!({"xp": 20}));
    }

    #[test]
    fn test_transform_field_declines_when_absent() {
        let rule: BoxRule<JsonOps> = transform_field("xp", |d: &Dynamic<JsonOps>| {
            DataResult::ok(d.clone())
        });
        assert!(rule.rewrite(&typed(json!({"other": 1}))).is_none());
    }

    #[test]
    fn test_transform_field_error_propagates() {
        let rule: BoxRule<JsonOps> = transform_field("xp", |_d: &Dynamic<JsonOps>| {
            DataResult::error(DataError::Codec("boom".to_string()))
        });
        let result = rule.rewrite(&typed(json!({"xp": 1}))).unwrap();
        assert!(result.is_err());
    }
}
