//! Format-agnostic tree abstraction for the datafix migration engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - [`TreeOps`] — the only surface through which the engine reads, builds,
//!   and edits serialization-tree values, implemented once per format.
//! - [`Dynamic`] — a tree value bundled with its ops.
//! - [`DataResult`] / [`DataError`] — the three-state propagation type
//!   (ok / ok-with-warnings / error) used by every codec and rule operation.

pub mod dynamic;
pub mod error;
pub mod ops;
pub mod result;

pub use dynamic::Dynamic;
pub use error::DataError;
pub use ops::TreeOps;
pub use result::DataResult;
