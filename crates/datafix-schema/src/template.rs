//! Structural type templates.

use datafix_tree::{DataError, TreeOps};

use crate::types::TypeRef;

/// A format-independent constant, used as the default of an optional field.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Empty,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    Str(String),
}

impl Constant {
    /// Builds this constant as a tree value in the given format.
    pub fn build<O: TreeOps>(&self, ops: &O) -> O::Value {
        match self {
            Constant::Empty => ops.empty(),
            Constant::Bool(v) => ops.bool(*v),
            Constant::I32(v) => ops.i32(*v),
            Constant::I64(v) => ops.i64(*v),
            Constant::F64(v) => ops.f64(*v),
            Constant::Str(v) => ops.string(v),
        }
    }
}

/// The shape of one logical type.
///
/// Templates are structural: a template knows how to validate, normalize,
/// and re-emit a tree value, but carries no domain types. `And` groups field
/// templates into a record; `Remainder` inside an `And` captures every
/// mapping entry not consumed by sibling fields and re-emits it at its own
/// position.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeTemplate {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Str,
    Empty,
    /// One required mapping entry.
    Field {
        name: String,
        value: Box<TypeTemplate>,
    },
    /// A mapping entry that may be absent; `default` is supplied on read.
    Optional {
        name: String,
        value: Box<TypeTemplate>,
        default: Constant,
    },
    /// An ordered sequence.
    List(Box<TypeTemplate>),
    /// Record-like conjunction of field and remainder templates.
    And(Vec<TypeTemplate>),
    /// A discriminated union embedded in a mapping, keyed by a string tag
    /// field at the same level as the variant fields.
    Choice {
        tag_field: String,
        variants: Vec<(String, TypeTemplate)>,
    },
    /// A late-bound reference, resolved through the active schema chain.
    Ref(TypeRef),
    /// Captures all mapping entries not consumed by siblings in an `And`.
    Remainder,
}

impl TypeTemplate {
    pub fn field(name: impl Into<String>, value: TypeTemplate) -> Self {
        TypeTemplate::Field {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn optional_field(
        name: impl Into<String>,
        value: TypeTemplate,
        default: Constant,
    ) -> Self {
        TypeTemplate::Optional {
            name: name.into(),
            value: Box::new(value),
            default,
        }
    }

    pub fn list(element: TypeTemplate) -> Self {
        TypeTemplate::List(Box::new(element))
    }

    pub fn and(parts: Vec<TypeTemplate>) -> Self {
        TypeTemplate::And(parts)
    }

    pub fn choice(
        tag_field: impl Into<String>,
        variants: Vec<(&str, TypeTemplate)>,
    ) -> Self {
        TypeTemplate::Choice {
            tag_field: tag_field.into(),
            variants: variants
                .into_iter()
                .map(|(tag, template)| (tag.to_string(), template))
                .collect(),
        }
    }

    pub fn reference(name: impl Into<TypeRef>) -> Self {
        TypeTemplate::Ref(name.into())
    }

    /// Checks the structural invariants:
    ///
    /// - an `And` holds only field, optional, and remainder parts, with at
    ///   most one remainder;
    /// - every `Choice` variant body is an `And`.
    ///
    /// Violations are template-construction bugs, reported as errors so
    /// schema registration can reject them.
    pub fn validate(&self) -> Result<(), DataError> {
        match self {
            TypeTemplate::And(parts) => {
                let mut remainders = 0;
                for part in parts {
                    match part {
                        TypeTemplate::Field { value, .. }
                        | TypeTemplate::Optional { value, .. } => value.validate()?,
                        TypeTemplate::Remainder => remainders += 1,
                        other => {
                            return Err(DataError::Codec(format!(
                                "invalid template: 'and' accepts field, optional and \
                                 remainder parts, found {other:?}"
                            )))
                        }
                    }
                }
                if remainders > 1 {
                    return Err(DataError::Codec(
                        "invalid template: 'and' may hold at most one remainder".to_string(),
                    ));
                }
                Ok(())
            }
            TypeTemplate::Choice { variants, .. } => {
                for (tag, body) in variants {
                    match body {
                        TypeTemplate::And(_) => body.validate()?,
                        other => {
                            return Err(DataError::Codec(format!(
                                "invalid template: choice variant '{tag}' must be an \
                                 'and' body, found {other:?}"
                            )))
                        }
                    }
                }
                Ok(())
            }
            TypeTemplate::Field { value, .. } | TypeTemplate::Optional { value, .. } => {
                value.validate()
            }
            TypeTemplate::List(element) => element.validate(),
            _ => Ok(()),
        }
    }

    /// The mapping keys directly consumed by this template when it sits in
    /// an `And` (its own field name, or nothing).
    pub(crate) fn consumed_key(&self) -> Option<&str> {
        match self {
            TypeTemplate::Field { name, .. } | TypeTemplate::Optional { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_accepts_single_remainder() {
        let template = TypeTemplate::and(vec![
            TypeTemplate::field("name", TypeTemplate::Str),
            TypeTemplate::Remainder,
        ]);
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_and_rejects_two_remainders() {
        let template = TypeTemplate::and(vec![TypeTemplate::Remainder, TypeTemplate::Remainder]);
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_and_rejects_bare_primitive_part() {
        let template = TypeTemplate::and(vec![TypeTemplate::Str]);
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_choice_requires_and_variants() {
        let bad = TypeTemplate::choice("type", vec![("zombie", TypeTemplate::Str)]);
        assert!(bad.validate().is_err());

        let good = TypeTemplate::choice(
            "type",
            vec![(
                "zombie",
                TypeTemplate::and(vec![TypeTemplate::field("angry", TypeTemplate::Bool)]),
            )],
        );
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_nested_validation_recurses() {
        let bad = TypeTemplate::list(TypeTemplate::and(vec![TypeTemplate::I32]));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_constant_builds_in_format() {
        use datafix_formats::JsonOps;
        use datafix_tree::TreeOps as _;
        let ops = JsonOps;
        assert_eq!(Constant::I32(30).build(&ops), serde_json::json!(30));
        assert_eq!(Constant::Str("x".into()).build(&ops), serde_json::json!("x"));
        assert!(ops.is_null(&Constant::Empty.build(&ops)));
    }
}
