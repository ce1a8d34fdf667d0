//! Version-ordered schema registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use datafix_tree::DataError;

use crate::schema::Schema;
use crate::types::DataVersion;

/// Frozen schemas ordered by version.
///
/// Lookup policy: [`SchemaRegistry::schema_for`] returns the schema bound at
/// the greatest version less than or equal to the requested one
/// (nearest-below). After [`SchemaRegistry::freeze`], every mutation is
/// rejected with [`DataError::FrozenMutation`].
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<DataVersion, Arc<Schema>>,
    frozen: bool,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its own version.
    pub fn register(&mut self, schema: Arc<Schema>) -> Result<(), DataError> {
        if self.frozen {
            return Err(DataError::FrozenMutation);
        }
        let version = schema.version();
        if self.schemas.contains_key(&version) {
            return Err(DataError::DuplicateRegistration(format!(
                "schema version {version} already registered"
            )));
        }
        self.schemas.insert(version, schema);
        Ok(())
    }

    /// The schema at the greatest version `≤ version`, if any.
    pub fn schema_for(&self, version: DataVersion) -> Option<Arc<Schema>> {
        self.schemas
            .range(..=version)
            .next_back()
            .map(|(_, schema)| schema.clone())
    }

    /// The schema bound at exactly `version`.
    pub fn schema_at(&self, version: DataVersion) -> Option<Arc<Schema>> {
        self.schemas.get(&version).cloned()
    }

    /// All registered versions, ascending.
    pub fn versions(&self) -> impl Iterator<Item = DataVersion> + '_ {
        self.schemas.keys().copied()
    }

    /// Freezes the registry. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
