//! Batch migration with rayon parallelism.
//!
//! The engine touches no shared mutable state and its registries are frozen,
//! so independent payloads migrate data-parallel. Results come back in input
//! order.

use rayon::prelude::*;

use datafix_schema::{DataVersion, TaggedValue};
use datafix_tree::{DataResult, TreeOps};

use crate::diagnostics::MigrationReport;
use crate::engine::Engine;

/// Migrates many payloads to `to` in parallel, one isolated engine pass per
/// payload. Each input carries its own source version.
pub fn update_batch<O>(
    engine: &Engine<O>,
    inputs: &[(TaggedValue<O>, DataVersion)],
    to: DataVersion,
) -> Vec<DataResult<(TaggedValue<O>, MigrationReport)>>
where
    O: TreeOps + Send + Sync,
    O::Value: Send + Sync,
{
    inputs
        .par_iter()
        .map(|(tagged, from)| engine.update(tagged, *from, to))
        .collect()
}

/// Sequential variant of [`update_batch`], for comparison and testing.
pub fn update_sequential<O>(
    engine: &Engine<O>,
    inputs: &[(TaggedValue<O>, DataVersion)],
    to: DataVersion,
) -> Vec<DataResult<(TaggedValue<O>, MigrationReport)>>
where
    O: TreeOps,
{
    inputs
        .iter()
        .map(|(tagged, from)| engine.update(tagged, *from, to))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{build_engine, Bootstrap};
    use crate::diagnostics::DiagnosticOptions;
    use crate::error::RegistryError;
    use crate::fix::Fix;
    use crate::fixes::FixRegistry;
    use crate::rules;
    use datafix_formats::JsonOps;
    use datafix_schema::{Schema, SchemaRegistry, TypeRef, TypeTemplate};
    use datafix_tree::{DataError, Dynamic};
    use serde_json::json;

    struct RenameBootstrap;

    impl Bootstrap<JsonOps> for RenameBootstrap {
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

    fn player(name: &str) -> (TaggedValue<JsonOps>, DataVersion) {
        (
            TaggedValue::new(
                TypeRef::new("player"),
                Dynamic::new(JsonOps, json!({"playerName": name})),
            ),
            DataVersion::new(1),
        )
    }

    #[test]
    fn test_batch_results_in_input_order() {
        let engine = build_engine(&RenameBootstrap, DiagnosticOptions::default()).unwrap();
        let inputs = vec![player("Steve"), player("Alex"), player("Herobrine")];
        let results = update_batch(&engine, &inputs, DataVersion::new(2));
        assert_eq!(results.len(), 3);
        for (result, expected) in results.iter().zip(["Steve", "Alex", "Herobrine"]) {
            let (migrated, _) = result.value().unwrap();
            assert_eq!(migrated.dynamic().value(), &json!({"name": expected}));
        }
    }

    #[test]
    fn test_batch_empty_inputs() {
        let engine = build_engine(&RenameBootstrap, DiagnosticOptions::default()).unwrap();
        let results = update_batch(&engine, &[], DataVersion::new(2));
        assert!(results.is_empty());
    }

    #[test]
    fn test_batch_matches_sequential() {
        let engine = build_engine(&RenameBootstrap, DiagnosticOptions::default()).unwrap();
        let inputs = vec![player("a"), player("b"), player("c"), player("d")];
        let parallel = update_batch(&engine, &inputs, DataVersion::new(2));
        let sequential = update_sequential(&engine, &inputs, DataVersion::new(2));
        assert_eq!(parallel.len(), sequential.len());
        for (p, s) in parallel.iter().zip(sequential.iter()) {
            let (p_value, _) = p.value().unwrap();
            let (s_value, _) = s.value().unwrap();
            assert_eq!(p_value, s_value);
        }
    }
}
