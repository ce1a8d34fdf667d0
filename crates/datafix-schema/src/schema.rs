//! Version-pinned type bindings with parent inheritance.

use std::collections::HashMap;
use std::sync::Arc;

use datafix_tree::DataError;

use crate::datatype::DataType;
use crate::template::TypeTemplate;
use crate::types::{DataVersion, TypeRef};

/// An immutable set of `TypeRef → TypeTemplate` bindings at one version.
///
/// A schema may inherit from a parent: lookup walks the chain from the
/// schema's own bindings upward. Schemas are frozen by construction —
/// [`SchemaBuilder::build`] consumes the builder, so a schema handed to the
/// registry can never change.
#[derive(Debug)]
pub struct Schema {
    version: DataVersion,
    parent: Option<Arc<Schema>>,
    bindings: HashMap<TypeRef, TypeTemplate>,
}

impl Schema {
    pub fn builder(version: DataVersion) -> SchemaBuilder {
        SchemaBuilder {
            version,
            parent: None,
            bindings: HashMap::new(),
        }
    }

    pub fn version(&self) -> DataVersion {
        self.version
    }

    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    /// Resolves a reference: own bindings first, then the parent chain.
    pub fn get_type(&self, reference: &TypeRef) -> Result<DataType, DataError> {
        let mut schema = self;
        loop {
            if let Some(template) = schema.bindings.get(reference) {
                return Ok(DataType::named(reference.clone(), template.clone()));
            }
            match &schema.parent {
                Some(parent) => schema = parent,
                None => return Err(DataError::UnresolvedType(reference.to_string())),
            }
        }
    }

    /// True if the reference resolves anywhere in the chain.
    pub fn has_type(&self, reference: &TypeRef) -> bool {
        self.get_type(reference).is_ok()
    }

    /// The references bound directly on this schema (not inherited).
    pub fn own_type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.bindings.keys()
    }
}

/// Mutable schema under construction. `build()` freezes it.
#[derive(Debug)]
pub struct SchemaBuilder {
    version: DataVersion,
    parent: Option<Arc<Schema>>,
    bindings: HashMap<TypeRef, TypeTemplate>,
}

impl SchemaBuilder {
    pub fn with_parent(mut self, parent: Arc<Schema>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Binds a template, validating its structural invariants. Re-binding a
    /// reference already bound on this builder is rejected.
    pub fn register(
        &mut self,
        reference: TypeRef,
        template: TypeTemplate,
    ) -> Result<(), DataError> {
        template.validate()?;
        if self.bindings.contains_key(&reference) {
            return Err(DataError::DuplicateRegistration(format!(
                "type '{reference}' already bound at version {}",
                self.version
            )));
        }
        self.bindings.insert(reference, template);
        Ok(())
    }

    /// Freezes the schema.
    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            version: self.version,
            parent: self.parent,
            bindings: self.bindings,
        })
    }
}
