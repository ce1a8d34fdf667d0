//! Ordered fix registry.

use std::sync::Arc;

use datafix_tree::TreeOps;

use crate::error::RegistryError;
use crate::fix::Fix;

/// Fixes in registration order, frozen before engine consumption.
///
/// Registration rejects non-elementary spans, duplicate `(name, from, to)`
/// triples, and any write after [`FixRegistry::freeze`]. Registration order
/// is the tie-break the planner uses for fixes sharing a `from` version.
pub struct FixRegistry<O: TreeOps> {
    fixes: Vec<Arc<Fix<O>>>,
    frozen: bool,
}

impl<O: TreeOps> FixRegistry<O> {
    pub fn new() -> Self {
        Self {
            fixes: Vec::new(),
            frozen: false,
        }
    }

    pub fn register(&mut self, fix: Fix<O>) -> Result<(), RegistryError> {
        if self.frozen {
            return Err(RegistryError::Frozen);
        }
        if fix.to() != fix.from().next() {
            return Err(RegistryError::NonElementaryFix {
                name: fix.name().to_string(),
                from: fix.from(),
                to: fix.to(),
            });
        }
        let duplicate = self.fixes.iter().any(|existing| {
            existing.name() == fix.name()
                && existing.from() == fix.from()
                && existing.to() == fix.to()
        });
        if duplicate {
            return Err(RegistryError::DuplicateFix {
                name: fix.name().to_string(),
                from: fix.from(),
                to: fix.to(),
            });
        }
        self.fixes.push(Arc::new(fix));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Fix<O>>> {
        self.fixes.iter()
    }

    /// Freezes the registry. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn into_fixes(self) -> Vec<Arc<Fix<O>>> {
        self.fixes
    }
}

impl<O: TreeOps> Default for FixRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: TreeOps> std::fmt::Debug for FixRegistry<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixRegistry")
            .field("fixes", &self.fixes)
            .field("frozen", &self.frozen)
            .finish()
    }
}
