//! The unit of migration input and output.

use datafix_tree::{Dynamic, TreeOps};

use crate::types::TypeRef;

/// A dynamic tree value tagged with the logical type it claims to be.
///
/// The schema version is *not* part of the tagged value — it travels in the
/// payload envelope and is passed to the engine explicitly.
pub struct TaggedValue<O: TreeOps> {
    type_ref: TypeRef,
    dynamic: Dynamic<O>,
}

impl<O: TreeOps> TaggedValue<O> {
    pub fn new(type_ref: TypeRef, dynamic: Dynamic<O>) -> Self {
        Self { type_ref, dynamic }
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn dynamic(&self) -> &Dynamic<O> {
        &self.dynamic
    }

    pub fn into_dynamic(self) -> Dynamic<O> {
        self.dynamic
    }

    /// The same tag over a new dynamic value.
    pub fn with_dynamic(&self, dynamic: Dynamic<O>) -> Self {
        Self {
            type_ref: self.type_ref.clone(),
            dynamic,
        }
    }
}

impl<O: TreeOps> Clone for TaggedValue<O> {
    fn clone(&self) -> Self {
        Self {
            type_ref: self.type_ref.clone(),
            dynamic: self.dynamic.clone(),
        }
    }
}

impl<O: TreeOps> PartialEq for TaggedValue<O> {
    fn eq(&self, other: &Self) -> bool {
        self.type_ref == other.type_ref && self.dynamic == other.dynamic
    }
}

impl<O: TreeOps> std::fmt::Debug for TaggedValue<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaggedValue")
            .field("type_ref", &self.type_ref)
            .field("value", self.dynamic.value())
            .finish()
    }
}
