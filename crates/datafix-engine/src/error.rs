//! Engine-side error types.

use datafix_schema::DataVersion;
use datafix_tree::DataError;
use thiserror::Error;

/// Errors from fix and engine registration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("no schema registered at or below version {0}")]
    MissingSchema(DataVersion),

    #[error("duplicate fix registration: '{name}' [{from} -> {to}]")]
    DuplicateFix {
        name: String,
        from: DataVersion,
        to: DataVersion,
    },

    #[error("fix '{name}' spans {from} -> {to}; elementary fixes step a single version")]
    NonElementaryFix {
        name: String,
        from: DataVersion,
        to: DataVersion,
    },

    #[error("fix registry is frozen; mutation rejected")]
    Frozen,

    #[error("schema registry must be frozen before engine construction")]
    NotFrozen,

    #[error("fix '{fix}' targets type '{type_ref}' with no binding at version {version}")]
    UnboundType {
        fix: String,
        type_ref: String,
        version: DataVersion,
    },
}

/// Errors from engine construction via a bootstrap.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Schema(#[from] DataError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors from loading declarative fix definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("TOML parse error in {file}: {message}")]
    TomlParse { file: String, message: String },

    #[error("unsupported default value for field '{field}': {value}")]
    UnsupportedDefault { field: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
