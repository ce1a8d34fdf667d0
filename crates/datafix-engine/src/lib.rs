//! The datafix migration engine.
//!
//! Given a registry of frozen schemas and an ordered list of declared fixes,
//! the [`Engine`] plans and executes multi-step migrations: it selects the
//! fixes covering the requested version span, decodes the payload with the
//! fix's input schema, applies the fix's [`Rule`], and re-encodes with the
//! output schema — preserving every field the rules do not address.
//!
//! Rules form a combinator algebra ([`rules`]); fixes are declared through
//! [`Fix`] values or loaded from TOML definitions ([`definition`]); each
//! `update` call produces a [`MigrationReport`] from its own diagnostic
//! event sink.

pub mod batch;
pub mod bootstrap;
pub mod definition;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fix;
pub mod fixes;
pub mod rule;

pub use bootstrap::{build_engine, Bootstrap};
pub use diagnostics::{DiagnosticOptions, MigrationEvent, MigrationReport};
pub use engine::{Engine, PlannedFix};
pub use error::{BuildError, DefinitionError, RegistryError};
pub use fix::{Fix, RuleFactory};
pub use fixes::FixRegistry;
pub use rule::{BoxRule, Rule};

/// Rule constructors, re-exported as a flat module for fix authors.
pub mod rules {
    pub use crate::rule::choice::{fix_choice, rename_choice, ChoiceCase};
    pub use crate::rule::combinators::{
        everywhere, if_type, named, noop, or_else, or_keep, rule_fn, seq, seq_all,
    };
    pub use crate::rule::fields::{add_field, remove_field, rename_field, transform_field};
}
