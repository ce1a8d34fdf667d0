//! Concrete tree formats for the datafix migration engine.
//!
//! Two [`datafix_tree::TreeOps`] implementations:
//!
//! - [`JsonOps`] — `serde_json::Value` with insertion-ordered objects.
//! - [`NodeOps`] — the native [`Node`] tree with the full numeric palette
//!   (i8/i16/i32/i64/f32/f64), used as the reference format for
//!   cross-format conversion and the binary envelope.
//!
//! Plus [`envelope`]: `(version, body)` payload envelope helpers. The engine
//! itself never parses envelopes; these are the adapter-side convenience.

pub mod envelope;
pub mod json;
pub mod node;

pub use json::JsonOps;
pub use node::{Node, NodeOps};
