//! The planner and migration engine.

use std::sync::Arc;
use std::time::Instant;

use datafix_schema::{DataVersion, Schema, SchemaRegistry, TaggedValue, TypeRef};
use datafix_tree::{DataError, DataResult, Dynamic, TreeOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::{DiagnosticOptions, DiagnosticSink, MigrationReport};
use crate::error::{BuildError, RegistryError};
use crate::fix::Fix;

/// One step of a planned migration, as reported by [`Engine::plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFix {
    pub name: String,
    pub from: DataVersion,
    pub to: DataVersion,
}

/// The migration engine: frozen schemas, ordered fixes, a target version.
///
/// The engine is stateless across calls — it holds only references to frozen
/// registries, so concurrent [`Engine::update`] calls are safe and
/// independent. Each call produces its own [`MigrationReport`].
pub struct Engine<O: TreeOps> {
    registry: Arc<SchemaRegistry>,
    fixes: Vec<Arc<Fix<O>>>,
    current_version: DataVersion,
    options: DiagnosticOptions,
}

impl<O: TreeOps> Engine<O> {
    /// Builds an engine over a frozen registry, checking that every fix's
    /// type is bound at both ends of its step.
    pub fn new(
        registry: Arc<SchemaRegistry>,
        fixes: Vec<Arc<Fix<O>>>,
        current_version: DataVersion,
        options: DiagnosticOptions,
    ) -> Result<Self, BuildError> {
        if !registry.is_frozen() {
            return Err(RegistryError::NotFrozen.into());
        }
        for fix in &fixes {
            for version in [fix.from(), fix.to()] {
                let schema = registry
                    .schema_for(version)
                    .ok_or(RegistryError::MissingSchema(version))?;
                if !schema.has_type(fix.type_ref()) {
                    return Err(RegistryError::UnboundType {
                        fix: fix.name().to_string(),
                        type_ref: fix.type_ref().to_string(),
                        version,
                    }
                    .into());
                }
            }
        }
        Ok(Self {
            registry,
            fixes,
            current_version,
            options,
        })
    }

    /// The version this engine migrates towards by default.
    pub fn current_version(&self) -> DataVersion {
        self.current_version
    }

    pub fn options(&self) -> DiagnosticOptions {
        self.options
    }

    /// The schema view at `version` (nearest-below lookup).
    pub fn schema_for(&self, version: DataVersion) -> Result<Arc<Schema>, RegistryError> {
        self.registry
            .schema_for(version)
            .ok_or(RegistryError::MissingSchema(version))
    }

    /// Dry-run planning: the fixes `update` would run for a payload of
    /// `type_ref` travelling from `from` to `to`, in application order.
    pub fn plan(&self, type_ref: &TypeRef, from: DataVersion, to: DataVersion) -> Vec<PlannedFix> {
        if to <= from {
            return Vec::new();
        }
        let mut selected: Vec<&Arc<Fix<O>>> = self
            .fixes
            .iter()
            .filter(|fix| fix.from() >= from && fix.to() <= to && fix.type_ref() == type_ref)
            .collect();
        selected.sort_by_key(|fix| fix.from());
        selected
            .into_iter()
            .map(|fix| PlannedFix {
                name: fix.name().to_string(),
                from: fix.from(),
                to: fix.to(),
            })
            .collect()
    }

    /// Migrates `tagged` from `from` up to the engine's current version.
    pub fn migrate_to_current(
        &self,
        tagged: &TaggedValue<O>,
        from: DataVersion,
    ) -> DataResult<(TaggedValue<O>, MigrationReport)> {
        self.update(tagged, from, self.current_version)
    }

    /// Applies the declared fix chain to carry `tagged` from `from` to `to`.
    ///
    /// Soft failures (partial decodes) are recorded as warnings and the
    /// migration proceeds. Hard failures abort: the result is a `Partial`
    /// carrying the value as of the last fully applied fix together with the
    /// error chain, and the report records the failure.
    pub fn update(
        &self,
        tagged: &TaggedValue<O>,
        from: DataVersion,
        to: DataVersion,
    ) -> DataResult<(TaggedValue<O>, MigrationReport)> {
        let mut sink = DiagnosticSink::new(self.options, tagged.type_ref().to_string(), from, to);

        if from == to {
            return DataResult::ok((tagged.clone(), sink.into_report()));
        }
        if to < from {
            return DataResult::error(DataError::Codec(format!(
                "cannot migrate backwards from version {from} to {to}"
            )));
        }
        if self.registry.schema_for(from).is_none() {
            return DataResult::error(DataError::Codec(
                RegistryError::MissingSchema(from).to_string(),
            ));
        }

        debug!(type_ref = %tagged.type_ref(), %from, %to, "migration started");
        sink.migration_started();
        let mut warnings = Vec::new();

        match self.apply_fixes(tagged, from, to, &mut sink, &mut warnings) {
            Ok(migrated) => {
                sink.completed();
                debug!(type_ref = %tagged.type_ref(), warnings = warnings.len(), "migration completed");
                DataResult::partial((tagged.with_dynamic(migrated), sink.into_report()), warnings)
            }
            Err((best_effort, error)) => {
                let message = error.to_string();
                sink.failed(&message);
                debug!(type_ref = %tagged.type_ref(), error = %message, "migration aborted");
                warnings.push(message);
                DataResult::partial(
                    (tagged.with_dynamic(best_effort), sink.into_report()),
                    warnings,
                )
            }
        }
    }

    /// Runs the selected fixes in order. `Err` carries the value as of the
    /// last fully applied fix together with the aborting error.
    fn apply_fixes(
        &self,
        tagged: &TaggedValue<O>,
        from: DataVersion,
        to: DataVersion,
        sink: &mut DiagnosticSink,
        warnings: &mut Vec<String>,
    ) -> Result<Dynamic<O>, (Dynamic<O>, DataError)> {
        // plan: fixes fully inside [from, to], ascending by start version;
        // the sort is stable, so registration order breaks ties
        let mut selected: Vec<&Arc<Fix<O>>> = self
            .fixes
            .iter()
            .filter(|fix| fix.from() >= from && fix.to() <= to)
            .collect();
        selected.sort_by_key(|fix| fix.from());

        let mut current = tagged.dynamic().clone();

        for fix in selected {
            if fix.type_ref() != tagged.type_ref() {
                continue;
            }
            debug!(fix = fix.name(), from = %fix.from(), to = %fix.to(), "applying fix");
            sink.fix_started(fix.name());
            let fix_start = Instant::now();

            let rule = match fix.rule(&self.registry) {
                Ok(rule) => rule,
                Err(e) => return Err((current, DataError::Codec(e.to_string()))),
            };
            let input_schema = match self.registry.schema_for(fix.from()) {
                Some(schema) => schema,
                None => {
                    let e = RegistryError::MissingSchema(fix.from());
                    return Err((current, DataError::Codec(e.to_string())));
                }
            };
            let output_schema = match self.registry.schema_for(fix.to()) {
                Some(schema) => schema,
                None => {
                    let e = RegistryError::MissingSchema(fix.to());
                    return Err((current, DataError::Codec(e.to_string())));
                }
            };
            let input_type = match input_schema.get_type(fix.type_ref()) {
                Ok(data_type) => data_type,
                Err(e) => return Err((current, e)),
            };

            // decode with the fix's input schema view
            let typed = match input_type.decode(&input_schema, &current) {
                DataResult::Ok(typed) => typed,
                DataResult::Partial { value, errors } => {
                    for message in &errors {
                        sink.warning(message);
                    }
                    warnings.extend(errors);
                    value
                }
                DataResult::Err(e) => return Err((current, e)),
            };

            let before = self
                .options
                .capture_snapshots
                .then(|| format!("{:?}", typed.dynamic().value()));

            // apply; a declining rule is identity
            let rule_start = Instant::now();
            let outcome = rule.rewrite(&typed);
            sink.rule_applied(rule.name(), outcome.is_some(), rule_start.elapsed());
            let rewritten = match outcome {
                None => typed,
                Some(DataResult::Ok(typed)) => typed,
                Some(DataResult::Partial { value, errors }) => {
                    for message in &errors {
                        sink.warning(message);
                    }
                    warnings.extend(errors);
                    value
                }
                Some(DataResult::Err(e)) => return Err((current, e)),
            };

            // re-encode with the fix's output schema view
            let output_type = match output_schema.get_type(fix.type_ref()) {
                Ok(data_type) => data_type,
                Err(e) => return Err((current, e)),
            };
            let encoded = match output_type.encode(&output_schema, rewritten.dynamic()) {
                DataResult::Ok(dynamic) => dynamic,
                DataResult::Partial { value, errors } => {
                    for message in &errors {
                        sink.warning(message);
                    }
                    warnings.extend(errors);
                    value
                }
                DataResult::Err(e) => return Err((current, e)),
            };

            let after = self
                .options
                .capture_snapshots
                .then(|| format!("{:?}", encoded.value()));
            current = encoded;
            sink.fix_completed(fix.name(), fix_start.elapsed(), before, after);
        }

        Ok(current)
    }
}

impl<O: TreeOps> std::fmt::Debug for Engine<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("current_version", &self.current_version)
            .field("fixes", &self.fixes.len())
            .field("options", &self.options)
            .finish()
    }
}
