//! Type DSL, schemas, and the schema registry.
//!
//! A [`TypeTemplate`] describes the shape of one logical type: primitives,
//! required and optional fields, lists, record conjunctions, discriminated
//! choices, late-bound references, and the remainder marker that round-trips
//! opaque fields. A [`Schema`] pins templates to a [`DataVersion`] and may
//! inherit bindings from a parent schema; the [`SchemaRegistry`] orders
//! frozen schemas by version for the migration engine.

pub mod datatype;
pub mod registry;
pub mod schema;
pub mod tagged;
pub mod template;
pub mod types;

pub use datatype::{DataType, Typed};
pub use registry::SchemaRegistry;
pub use schema::{Schema, SchemaBuilder};
pub use tagged::TaggedValue;
pub use template::{Constant, TypeTemplate};
pub use types::{DataVersion, TypeRef};
