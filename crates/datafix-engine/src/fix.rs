//! Declared, version-bounded migrations for one type reference.

use std::sync::{Arc, OnceLock};

use datafix_schema::{DataVersion, Schema, SchemaRegistry, TypeRef};
use datafix_tree::TreeOps;

use crate::error::RegistryError;
use crate::rule::{BoxRule, Rule};

/// Produces a fix's rule from the input and output schema views. Called at
/// most once per fix; the factory must not observe any other schema.
pub type RuleFactory<O> = Box<dyn Fn(&Arc<Schema>, &Arc<Schema>) -> BoxRule<O> + Send + Sync>;

/// A declared migration step: `from → to` for one [`TypeRef`].
///
/// The rule is produced lazily, once, on first request, from the schemas the
/// registry binds at `from` and `to`.
pub struct Fix<O: TreeOps> {
    name: String,
    from: DataVersion,
    to: DataVersion,
    type_ref: TypeRef,
    make_rule: RuleFactory<O>,
    rule: OnceLock<Result<Arc<dyn Rule<O>>, RegistryError>>,
}

impl<O: TreeOps> Fix<O> {
    pub fn new(
        name: impl Into<String>,
        from: DataVersion,
        to: DataVersion,
        type_ref: TypeRef,
        make_rule: RuleFactory<O>,
    ) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            type_ref,
            make_rule,
            rule: OnceLock::new(),
        }
    }

    /// A single-version-step fix (`to = from + 1`).
    pub fn elementary(
        name: impl Into<String>,
        from: DataVersion,
        type_ref: TypeRef,
        make_rule: RuleFactory<O>,
    ) -> Self {
        let to = from.next();
        Self::new(name, from, to, type_ref, make_rule)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from(&self) -> DataVersion {
        self.from
    }

    pub fn to(&self) -> DataVersion {
        self.to
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// The fix's rule, built on first call from the registry's schema views
    /// at `from` and `to`.
    pub fn rule(&self, registry: &SchemaRegistry) -> Result<Arc<dyn Rule<O>>, RegistryError> {
        self.rule
            .get_or_init(|| {
                let input = registry
                    .schema_for(self.from)
                    .ok_or(RegistryError::MissingSchema(self.from))?;
                let output = registry
                    .schema_for(self.to)
                    .ok_or(RegistryError::MissingSchema(self.to))?;
                Ok(Arc::from((self.make_rule)(&input, &output)))
            })
            .clone()
    }
}

impl<O: TreeOps> std::fmt::Debug for Fix<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fix")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("type_ref", &self.type_ref)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;
    use datafix_formats::JsonOps;
    use datafix_schema::DataVersion;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry_with_versions(versions: &[u32]) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        for &v in versions {
            registry
                .register(Schema::builder(DataVersion::new(v)).build())
                .unwrap();
        }
        registry.freeze();
        registry
    }

    #[test]
    fn test_elementary_steps_one_version() {
        let fix: Fix<JsonOps> = Fix::elementary(
            "player_rename",
            DataVersion::new(1),
            TypeRef::new("player"),
            Box::new(|_, _| rules::noop()),
        );
        assert_eq!(fix.from(), DataVersion::new(1));
        assert_eq!(fix.to(), DataVersion::new(2));
    }

    #[test]
    fn test_rule_is_built_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let fix: Fix<JsonOps> = Fix::elementary(
            "counting",
            DataVersion::new(1),
            TypeRef::new("player"),
            Box::new(|_, _| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                rules::noop()
            }),
        );
        let registry = registry_with_versions(&[1, 2]);
        fix.rule(&registry).unwrap();
        fix.rule(&registry).unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rule_fails_without_schema() {
        let fix: Fix<JsonOps> = Fix::elementary(
            "orphan",
            DataVersion::new(5),
            TypeRef::new("player"),
            Box::new(|_, _| rules::noop()),
        );
        let registry = registry_with_versions(&[]);
        assert!(matches!(
            fix.rule(&registry),
            Err(RegistryError::MissingSchema(v)) if v == DataVersion::new(5)
        ));
    }
}
