//! Composable rewrite rules over `(DataType, Typed)` values.
//!
//! A rule inspects a typed value and either declines (`None`), rewrites it
//! (`Some(Ok)` / `Some(Partial)`), or fails hard (`Some(Err)`). Rules are
//! values: [`combinators`] sequence, alternate, gate, and recursively apply
//! them; [`fields`] and [`choice`] provide the primitive rewrites fixes are
//! made of.

pub mod choice;
pub mod combinators;
pub mod fields;
pub(crate) mod walk;

use datafix_schema::Typed;
use datafix_tree::{DataResult, TreeOps};

/// A context-free tree rewrite.
///
/// `rewrite` returns `None` when the rule does not apply to the presented
/// value; the caller treats that as identity. A returned `Some` may carry a
/// value of a different type only when the rule explicitly rewrites the type.
pub trait Rule<O: TreeOps>: Send + Sync {
    /// Debug name, used in diagnostic events.
    fn name(&self) -> &str {
        "anonymous"
    }

    fn rewrite(&self, typed: &Typed<O>) -> Option<DataResult<Typed<O>>>;
}

/// The boxed form rules are passed around in.
pub type BoxRule<O> = Box<dyn Rule<O>>;
