//! Host bootstrap contract and the engine factory.

use std::sync::Arc;

use datafix_schema::{DataVersion, SchemaRegistry};
use datafix_tree::{DataError, TreeOps};

use crate::diagnostics::DiagnosticOptions;
use crate::engine::Engine;
use crate::error::{BuildError, RegistryError};
use crate::fixes::FixRegistry;

/// What a host supplies to build an engine: the current version and the
/// schema and fix populations.
///
/// `current_version` is an explicit method on the contract — there is no
/// reflective discovery of any kind.
pub trait Bootstrap<O: TreeOps> {
    /// The version freshly written payloads carry.
    fn current_version(&self) -> DataVersion;

    /// Registers every schema version the host knows.
    fn register_schemas(&self, registry: &mut SchemaRegistry) -> Result<(), DataError>;

    /// Registers every declared fix, in the order ties should break.
    fn register_fixes(&self, fixes: &mut FixRegistry<O>) -> Result<(), RegistryError>;
}

/// Builds a ready engine from a bootstrap: registers and freezes the schema
/// registry, registers and freezes the fix list, and validates fix coverage.
pub fn build_engine<O: TreeOps, B: Bootstrap<O>>(
    bootstrap: &B,
    options: DiagnosticOptions,
) -> Result<Engine<O>, BuildError> {
    let mut registry = SchemaRegistry::new();
    bootstrap.register_schemas(&mut registry)?;
    registry.freeze();

    let mut fixes = FixRegistry::new();
    bootstrap.register_fixes(&mut fixes)?;
    fixes.freeze();

    Engine::new(
        Arc::new(registry),
        fixes.into_fixes(),
        bootstrap.current_version(),
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::Fix;
    use crate::rules;
    use datafix_formats::JsonOps;
    use datafix_schema::{Schema, TypeRef, TypeTemplate};

    struct TestBootstrap;

    impl Bootstrap<JsonOps> for TestBootstrap {
        fn current_version(&self) -> DataVersion {
            DataVersion::new(2)
        }

        fn register_schemas(&self, registry: &mut SchemaRegistry) -> Result<(), DataError> {
            let mut v1 = Schema::builder(DataVersion::new(1));
            v1.register(
                TypeRef::new("player"),
                TypeTemplate::and(vec![
                    TypeTemplate::field("playerName", TypeTemplate::Str),
                    TypeTemplate::Remainder,
                ]),
            )?;
            let v1 = v1.build();

            let mut v2 = Schema::builder(DataVersion::new(2)).with_parent(v1.clone());
            v2.register(
                TypeRef::new("player"),
                TypeTemplate::and(vec![
                    TypeTemplate::field("name", TypeTemplate::Str),
                    TypeTemplate::Remainder,
                ]),
            )?;
            registry.register(v1)?;
            registry.register(v2.build())?;
            Ok(())
        }

        fn register_fixes(&self, fixes: &mut FixRegistry<JsonOps>) -> Result<(), RegistryError> {
            fixes.register(Fix::elementary(
                "player_v1_to_v2",
                DataVersion::new(1),
                TypeRef::new("player"),
                Box::new(|_, _| rules::rename_field("playerName", "name")),
            ))
        }
    }

    #[test]
    fn test_build_engine_from_bootstrap() {
        let engine = build_engine(&TestBootstrap, DiagnosticOptions::default()).unwrap();
        assert_eq!(engine.current_version(), DataVersion::new(2));
        assert!(engine.schema_for(DataVersion::new(1)).is_ok());
    }

    #[test]
    fn test_build_engine_rejects_uncovered_fix() {
        struct BrokenBootstrap;

        impl Bootstrap<JsonOps> for BrokenBootstrap {
            fn current_version(&self) -> DataVersion {
                DataVersion::new(2)
            }

            fn register_schemas(&self, registry: &mut SchemaRegistry) -> Result<(), DataError> {
                registry.register(Schema::builder(DataVersion::new(1)).build())
            }

            fn register_fixes(
                &self,
                fixes: &mut FixRegistry<JsonOps>,
            ) -> Result<(), RegistryError> {
                fixes.register(Fix::elementary(
                    "ghost_fix",
                    DataVersion::new(1),
                    TypeRef::new("ghost"),
                    Box::new(|_, _| rules::noop()),
                ))
            }
        }

        let result = build_engine(&BrokenBootstrap, DiagnosticOptions::default());
        assert!(matches!(
            result,
            Err(BuildError::Registry(RegistryError::UnboundType { .. }))
        ));
    }
}
