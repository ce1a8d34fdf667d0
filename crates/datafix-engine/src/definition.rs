//! Declarative fix definitions loaded from TOML.
//!
//! A definition file declares one fix: a `[meta]` table naming the step and
//! an ordered `[[steps]]` array of field rewrites. Example:
//!
//! ```toml
//! [meta]
//! name = "player_v1_to_v2"
//! from = 1
//! to = 2
//! type = "player"
//!
//! [[steps]]
//! op = "rename_field"
//! from = "playerName"
//! to = "name"
//!
//! [[steps]]
//! op = "add_field"
//! field = "level"
//! default = 1
//! ```
//!
//! Unknown step kinds and non-scalar defaults are load errors, not runtime
//! surprises.

use std::path::Path;

use serde::{Deserialize, Serialize};

use datafix_schema::{DataVersion, TypeRef};
use datafix_tree::TreeOps;

use crate::error::DefinitionError;
use crate::fix::{Fix, RuleFactory};
use crate::rule::BoxRule;
use crate::rules;

/// One declarative fix — one per TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixDefinition {
    pub meta: FixMeta,
    pub steps: Vec<StepDefinition>,
}

/// Metadata about the fix being declared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixMeta {
    pub name: String,
    pub from: u32,
    pub to: u32,
    #[serde(rename = "type")]
    pub type_ref: String,
}

/// A single rewrite step, applied in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StepDefinition {
    RenameField { from: String, to: String },
    RemoveField { field: String },
    AddField { field: String, default: toml::Value },
    RenameChoice { tag_field: String, from: String, to: String },
}

impl FixDefinition {
    /// Parses a definition from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, DefinitionError> {
        let definition: FixDefinition =
            toml::from_str(content).map_err(|e| DefinitionError::TomlParse {
                file: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        definition.validate()?;
        Ok(definition)
    }

    /// Loads every `.toml` definition from a directory, sorted by file name
    /// for deterministic registration order.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, DefinitionError> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut definitions = Vec::new();
        for entry in entries {
            let path = entry.path();
            if path.extension().map(|e| e == "toml").unwrap_or(false) {
                let content = std::fs::read_to_string(&path)?;
                let definition: FixDefinition =
                    toml::from_str(&content).map_err(|e| DefinitionError::TomlParse {
                        file: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                definition.validate()?;
                definitions.push(definition);
            }
        }
        Ok(definitions)
    }

    /// Builds the runnable fix. The rule sequences the declared steps.
    pub fn into_fix<O: TreeOps + 'static>(self) -> Fix<O> {
        let steps = self.steps;
        let make_rule: RuleFactory<O> = Box::new(move |_input, _output| {
            let step_rules: Vec<BoxRule<O>> = steps.iter().map(step_rule).collect();
            rules::seq_all(step_rules)
        });
        Fix::new(
            self.meta.name,
            DataVersion::new(self.meta.from),
            DataVersion::new(self.meta.to),
            TypeRef::new(self.meta.type_ref),
            make_rule,
        )
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        for step in &self.steps {
            if let StepDefinition::AddField { field, default } = step {
                if !matches!(
                    default,
                    toml::Value::Boolean(_)
                        | toml::Value::Integer(_)
                        | toml::Value::Float(_)
                        | toml::Value::String(_)
                ) {
                    return Err(DefinitionError::UnsupportedDefault {
                        field: field.clone(),
                        value: default.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn step_rule<O: TreeOps + 'static>(step: &StepDefinition) -> BoxRule<O> {
    match step {
        StepDefinition::RenameField { from, to } => rules::rename_field(from, to),
        StepDefinition::RemoveField { field } => rules::remove_field(field),
        StepDefinition::AddField { field, default } => {
            let default = default.clone();
            rules::add_field(field, move |ops: &O| scalar_value(ops, &default))
        }
        StepDefinition::RenameChoice {
            tag_field,
            from,
            to,
        } => rules::rename_choice(tag_field, from, to),
    }
}

/// Builds a TOML scalar in the target format. Non-scalars are rejected at
/// load time, so anything else collapses to empty.
fn scalar_value<O: TreeOps>(ops: &O, value: &toml::Value) -> O::Value {
    match value {
        toml::Value::Boolean(b) => ops.bool(*b),
        toml::Value::Integer(i) => {
            if *i >= i32::MIN as i64 && *i <= i32::MAX as i64 {
                ops.i32(*i as i32)
            } else {
                ops.i64(*i)
            }
        }
        toml::Value::Float(f) => ops.f64(*f),
        toml::Value::String(s) => ops.string(s),
        _ => ops.empty(),
    }
}
