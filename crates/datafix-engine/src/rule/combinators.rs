//! Rule combinators: sequencing, alternation, gating, naming, traversal.

use std::marker::PhantomData;
use std::sync::Arc;

use datafix_schema::{Schema, TypeRef, Typed};
use datafix_tree::{DataResult, Dynamic, TreeOps};

use super::walk;
use super::{BoxRule, Rule};

/// The rule that never applies.
pub fn noop<O: TreeOps + 'static>() -> BoxRule<O> {
    Box::new(Noop {
        _marker: PhantomData,
    })
}

/// Applies `first`; if it applied, applies `second` to the result, otherwise
/// applies `second` to the original. `None` only when neither applied.
pub fn seq<O: TreeOps + 'static>(first: BoxRule<O>, second: BoxRule<O>) -> BoxRule<O> {
    Box::new(Seq { first, second })
}

/// Left fold of [`seq`] over all rules.
pub fn seq_all<O: TreeOps + 'static>(rules: Vec<BoxRule<O>>) -> BoxRule<O> {
    let mut rules = rules.into_iter();
    let first = match rules.next() {
        Some(rule) => rule,
        None => return noop(),
    };
    rules.fold(first, seq)
}

/// Applies `first`; falls back to `second` only when `first` declined.
pub fn or_else<O: TreeOps + 'static>(first: BoxRule<O>, second: BoxRule<O>) -> BoxRule<O> {
    Box::new(OrElse { first, second })
}

/// Gates `inner` on the presented type's reference.
pub fn if_type<O: TreeOps + 'static>(reference: TypeRef, inner: BoxRule<O>) -> BoxRule<O> {
    Box::new(IfType { reference, inner })
}

/// Attaches a debug name; otherwise identity.
pub fn named<O: TreeOps + 'static>(name: &str, inner: BoxRule<O>) -> BoxRule<O> {
    Box::new(Named {
        name: name.to_string(),
        inner,
    })
}

/// Converts a declining rule into one that returns its input unchanged, so
/// the result is always `Some`.
pub fn or_keep<O: TreeOps + 'static>(inner: BoxRule<O>) -> BoxRule<O> {
    Box::new(OrKeep { inner })
}

/// Applies `inner` at every structural position, bottom-up and left-to-right
/// at each level. The schema resolves type references met during descent.
pub fn everywhere<O: TreeOps + 'static>(inner: BoxRule<O>, schema: Arc<Schema>) -> BoxRule<O> {
    Box::new(Everywhere { inner, schema })
}

/// Wraps a closure as a rule. The escape hatch for computed migrations that
/// the field primitives cannot express.
pub fn rule_fn<O, F>(name: &str, f: F) -> BoxRule<O>
where
    O: TreeOps + 'static,
    F: Fn(&Typed<O>) -> Option<DataResult<Typed<O>>> + Send + Sync + 'static,
{
    Box::new(FnRule {
        name: name.to_string(),
        f,
    })
}

fn prepend_warnings<O: TreeOps>(
    result: DataResult<Typed<O>>,
    mut warnings: Vec<String>,
) -> DataResult<Typed<O>> {
    if warnings.is_empty() {
        return result;
    }
    match result {
        DataResult::Ok(value) => DataResult::Partial {
            value,
            errors: warnings,
        },
        DataResult::Partial { value, errors } => {
            warnings.extend(errors);
            DataResult::Partial {
                value,
                errors: warnings,
            }
        }
        DataResult::Err(e) => DataResult::Err(e),
    }
}

struct Noop<O> {
    _marker: PhantomData<fn() -> O>,
}

impl<O: TreeOps> Rule<O> for Noop<O> {
    fn name(&self) -> &str {
        "noop"
    }

    fn rewrite(&self, _typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        None
    }
}

struct Seq<O: TreeOps> {
    first: BoxRule<O>,
    second: BoxRule<O>,
}

impl<O: TreeOps> Rule<O> for Seq<O> {
    fn name(&self) -> &str {
        "seq"
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        match self.first.rewrite(typed) {
            None => self.second.rewrite(typed),
            Some(DataResult::Err(e)) => Some(DataResult::Err(e)),
            Some(first_result) => {
                let warnings = first_result.errors().to_vec();
                let intermediate = match first_result.into_result() {
                    Ok(value) => value,
                    Err(e) => return Some(DataResult::Err(e)),
                };
                match self.second.rewrite(&intermediate) {
                    None => Some(DataResult::partial(intermediate, warnings)),
                    Some(second_result) => Some(prepend_warnings(second_result, warnings)),
                }
            }
        }
    }
}

struct OrElse<O: TreeOps> {
    first: BoxRule<O>,
    second: BoxRule<O>,
}

impl<O: TreeOps> Rule<O> for OrElse<O> {
    fn name(&self) -> &str {
        "or_else"
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        match self.first.rewrite(typed) {
            None => self.second.rewrite(typed),
            applied => applied,
        }
    }
}

struct IfType<O: TreeOps> {
    reference: TypeRef,
    inner: BoxRule<O>,
}

impl<O: TreeOps> Rule<O> for IfType<O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        if typed.data_type().reference() == Some(&self.reference) {
            self.inner.rewrite(typed)
        } else {
            None
        }
    }
}

struct Named<O: TreeOps> {
    name: String,
    inner: BoxRule<O>,
}

impl<O: TreeOps> Rule<O> for Named<O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        self.inner.rewrite(typed)
    }
}

struct OrKeep<O: TreeOps> {
    inner: BoxRule<O>,
}

impl<O: TreeOps> Rule<O> for OrKeep<O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        match self.inner.rewrite(typed) {
            None => Some(DataResult::ok(typed.clone())),
            applied => applied,
        }
    }
}

struct Everywhere<O: TreeOps> {
    inner: BoxRule<O>,
    schema: Arc<Schema>,
}

impl<O: TreeOps> Rule<O> for Everywhere<O> {
    fn name(&self) -> &str {
        "everywhere"
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        let ops = typed.dynamic().ops().clone();
        let mut positions =
            walk::collect_positions(&self.schema, &ops, typed.data_type(), typed.dynamic().value());
        // deepest first; the sort is stable, so same-depth positions keep
        // their left-to-right discovery order
        positions.sort_by(|a, b| b.depth.cmp(&a.depth));

        let mut root = typed.dynamic().value().clone();
        let mut applied = false;
        let mut warnings = Vec::new();

        for position in &positions {
            let Some(sub) = walk::get_at_path(&ops, &root, &position.path) else {
                continue;
            };
            let sub_typed = Typed::new(position.data_type.clone(), Dynamic::new(ops.clone(), sub));
            match self.inner.rewrite(&sub_typed) {
                None => {}
                Some(DataResult::Err(e)) => return Some(DataResult::Err(e)),
                Some(result) => {
                    applied = true;
                    warnings.extend(result.errors().iter().cloned());
                    let rewritten = match result.into_result() {
                        Ok(value) => value,
                        Err(e) => return Some(DataResult::Err(e)),
                    };
                    root = walk::set_at_path(
                        &ops,
                        &root,
                        &position.path,
                        rewritten.into_dynamic().into_value(),
                    );
                }
            }
        }

        if applied {
            Some(DataResult::partial(typed.with_value(root), warnings))
        } else {
            None
        }
    }
}

struct FnRule<F> {
    name: String,
    f: F,
}

impl<O, F> Rule<O> for FnRule<F>
where
    O: TreeOps,
    F: Fn(&Typed<O>) -> Option<DataResult<Typed<O>>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        (self.f)(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::fields::{add_field, remove_field, rename_field};
    use datafix_formats::JsonOps;
    use datafix_schema::{DataType, DataVersion, TypeTemplate};
    use serde_json::json;

    fn typed(value: serde_json::Value) -> Typed<JsonOps> {
        Typed::new(
            DataType::unnamed(TypeTemplate::and(vec![TypeTemplate::Remainder])),
            Dynamic::new(JsonOps, value),
        )
    }

    #[test]
    fn test_noop_never_applies() {
        let rule: BoxRule<JsonOps> = noop();
        assert!(rule.rewrite(&typed(json!({"a": 1}))).is_none());
    }

    #[test]
    fn test_seq_threads_result() {
        let rule = seq(rename_field("a", "b"), rename_field("b", "c"));
        let result = rule.rewrite(&typed(json!({"a": 1}))).unwrap();
        assert_eq!(
            result.into_result().unwrap().dynamic().value(),
            &json!({"c": 1})
        );
    }

    #[test]
    fn test_seq_falls_through_to_second() {
        let rule = seq(rename_field("missing", "x"), rename_field("a", "b"));
        let result = rule.rewrite(&typed(json!({"a": 1}))).unwrap();
        assert_eq!(
            result.into_result().unwrap().dynamic().value(),
            &json!({"b": 1})
        );
    }

    #[test]
    fn test_seq_none_when_neither_applies() {
        let rule: BoxRule<JsonOps> = seq(noop(), noop());
        assert!(rule.rewrite(&typed(json!({"a": 1}))).is_none());
    }

    #[test]
    fn test_seq_all_applies_in_order() {
        let rule = seq_all(vec![
            rename_field("a", "b"),
            remove_field("junk"),
            add_field("fresh", |ops: &JsonOps| {
                datafix_tree::TreeOps::i32(ops, 1)
            }),
        ]);
        let result = rule
            .rewrite(&typed(json!({"a": 1, "junk": true})))
            .unwrap();
        assert_eq!(
            result.into_result().unwrap().dynamic().value(),
            &json!({"b": 1, "fresh": 1})
        );
    }

    #[test]
    fn test_or_else_prefers_first() {
        let rule = or_else(rename_field("a", "x"), rename_field("a", "y"));
        let result = rule.rewrite(&typed(json!({"a": 1}))).unwrap();
        assert_eq!(
            result.into_result().unwrap().dynamic().value(),
            &json!({"x": 1})
        );
    }

    #[test]
    fn test_if_type_gates_on_reference() {
        let player = TypeRef::new("player");
        let rule = if_type(player.clone(), rename_field("a", "b"));

        let matching = Typed::new(
            DataType::named(player, TypeTemplate::and(vec![TypeTemplate::Remainder])),
            Dynamic::new(JsonOps, json!({"a": 1})),
        );
        assert!(rule.rewrite(&matching).is_some());
        assert!(rule.rewrite(&typed(json!({"a": 1}))).is_none());
    }

    #[test]
    fn test_named_changes_only_the_name() {
        let rule = named("player_rename", rename_field("a", "b"));
        assert_eq!(rule.name(), "player_rename");
        assert!(rule.rewrite(&typed(json!({"a": 1}))).is_some());
    }

    #[test]
    fn test_or_keep_always_applies() {
        let rule: BoxRule<JsonOps> = or_keep(noop());
        let input = typed(json!({"a": 1}));
        let result = rule.rewrite(&input).unwrap().into_result().unwrap();
        assert_eq!(result.dynamic().value(), &json!({"a": 1}));
    }

    #[test]
    fn test_or_keep_is_idempotent() {
        let single: BoxRule<JsonOps> = or_keep(rename_field("a", "b"));
        let double: BoxRule<JsonOps> = or_keep(or_keep(rename_field("a", "b")));
        for input in [json!({"a": 1}), json!({"z": 9}), json!(5)] {
            let lhs = single.rewrite(&typed(input.clone())).unwrap();
            let rhs = double.rewrite(&typed(input)).unwrap();
            assert_eq!(lhs, rhs);
        }
    }

    #[test]
    fn test_everywhere_noop_is_identity() {
        let schema = Schema::builder(DataVersion::new(1)).build();
        let rule: BoxRule<JsonOps> = everywhere(noop(), schema);
        // noop applies nowhere, so the traversal reports "did not apply"
        assert!(rule.rewrite(&typed(json!({"a": {"b": [1, 2]}}))).is_none());
    }

    #[test]
    fn test_everywhere_rewrites_nested_positions() {
        let mut builder = Schema::builder(DataVersion::new(1));
        builder
            .register(
                TypeRef::new("player"),
                TypeTemplate::and(vec![
                    TypeTemplate::field("stats", TypeTemplate::and(vec![
                        TypeTemplate::field("xp", TypeTemplate::I32),
                        TypeTemplate::Remainder,
                    ])),
                    TypeTemplate::Remainder,
                ]),
            )
            .unwrap();
        let schema = builder.build();
        let data_type = schema.get_type(&TypeRef::new("player")).unwrap();

        // increment every i32 leaf
        let bump = rule_fn("bump", |t: &Typed<JsonOps>| {
            if !matches!(t.data_type().template(), TypeTemplate::I32) {
                return None;
            }
            let ops = t.dynamic().ops().clone();
            let n = datafix_tree::TreeOps::as_number(&ops, t.dynamic().value())
                .into_result()
                .ok()?;
            Some(DataResult::ok(
                t.with_value(datafix_tree::TreeOps::i32(&ops, n as i32 + 1)),
            ))
        });
        let rule = everywhere(bump, schema.clone());
        let input = Typed::new(data_type, Dynamic::new(JsonOps, json!({"stats": {"xp": 41}})));
        let result = rule.rewrite(&input).unwrap().into_result().unwrap();
        assert_eq!(result.dynamic().value(), &json!({"stats": {"xp": 42}}));
    }

    #[test]
    fn test_everywhere_survives_deep_trees() {
        // a 1500-deep nested list type over a matching value
        let mut template = TypeTemplate::I32;
        for _ in 0..1500 {
            template = TypeTemplate::list(template);
        }
        let mut value = json!(0);
        for _ in 0..1500 {
            value = json!([value]);
        }
        let schema = Schema::builder(DataVersion::new(1)).build();
        let bump = rule_fn("bump", |t: &Typed<JsonOps>| {
            if !matches!(t.data_type().template(), TypeTemplate::I32) {
                return None;
            }
            let ops = t.dynamic().ops().clone();
            Some(DataResult::ok(
                t.with_value(datafix_tree::TreeOps::i32(&ops, 7)),
            ))
        });
        let rule = everywhere(bump, schema);
        let input = Typed::new(DataType::unnamed(template), Dynamic::new(JsonOps, value));
        let result = rule.rewrite(&input).unwrap().into_result().unwrap();
        // the single leaf was rewritten at depth 1500
        let mut leaf = result.dynamic().value().clone();
        for _ in 0..1500 {
            leaf = leaf.as_array().unwrap()[0].clone();
        }
        assert_eq!(leaf, json!(7));
    }
}
