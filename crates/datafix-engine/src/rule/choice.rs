//! Tagged-union rewrite primitives.

use std::collections::HashMap;

use datafix_schema::Typed;
use datafix_tree::{DataResult, Dynamic, TreeOps};

use super::{BoxRule, Rule};

/// A per-tag rewrite applied to the enclosing map of a choice value.
pub type ChoiceCase<O> =
    Box<dyn Fn(&Dynamic<O>) -> DataResult<Dynamic<O>> + Send + Sync>;

/// Reads `tag_field`; if its value is one of the known string tags, applies
/// that tag's rewrite to the enclosing map. Unknown tags decline.
pub fn fix_choice<O: TreeOps + 'static>(
    tag_field: &str,
    cases: Vec<(&str, ChoiceCase<O>)>,
) -> BoxRule<O> {
    Box::new(FixChoice {
        rule_name: format!("fix_choice({tag_field})"),
        tag_field: tag_field.to_string(),
        cases: cases
            .into_iter()
            .map(|(tag, case)| (tag.to_string(), case))
            .collect(),
    })
}

/// Rewrites the value of `tag_field` from `old_tag` to `new_tag` iff equal.
/// Every other entry, and every other tag value, is left untouched.
pub fn rename_choice<O: TreeOps + 'static>(
    tag_field: &str,
    old_tag: &str,
    new_tag: &str,
) -> BoxRule<O> {
    Box::new(RenameChoice {
        rule_name: format!("rename_choice({tag_field}: {old_tag} -> {new_tag})"),
        tag_field: tag_field.to_string(),
        old_tag: old_tag.to_string(),
        new_tag: new_tag.to_string(),
    })
}

struct FixChoice<O: TreeOps> {
    rule_name: String,
    tag_field: String,
    cases: HashMap<String, ChoiceCase<O>>,
}

impl<O: TreeOps> Rule<O> for FixChoice<O> {
    fn name(&self) -> &str {
        &self.rule_name
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        let ops = typed.dynamic().ops();
        let value = typed.dynamic().value();
        if !ops.is_map(value) {
            return None;
        }
        let tag_value = ops.get(value, &self.tag_field)?;
        let tag = ops.as_string(&tag_value).into_result().ok()?;
        let case = self.cases.get(&tag)?;
        let result = case(typed.dynamic());
        Some(result.map(|dynamic| typed.with_value(dynamic.into_value())))
    }
}

struct RenameChoice {
    rule_name: String,
    tag_field: String,
    old_tag: String,
    new_tag: String,
}

impl<O: TreeOps> Rule<O> for RenameChoice {
    fn name(&self) -> &str {
        &self.rule_name
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>> {
        let ops = typed.dynamic().ops();
        let value = typed.dynamic().value();
        if !ops.is_map(value) {
            return None;
        }
        let tag_value = ops.get(value, &self.tag_field)?;
        let tag = ops.as_string(&tag_value).into_result().ok()?;
        if tag != self.old_tag {
            return None;
        }
        Some(DataResult::ok(typed.with_value(ops.set(
            value,
            &self.tag_field,
            ops.string(&self.new_tag),
        ))))
    }
}
