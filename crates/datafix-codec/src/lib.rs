//! Typed codec algebra over datafix tree values.
//!
//! A [`Codec`] translates between domain values and tree values through any
//! [`datafix_tree::TreeOps`]. Codecs compose: primitives ([`BOOL`], [`I32`],
//! [`STRING`], …) combine through [`combinators`] (lists, options, pairs,
//! bounded ranges) and project into mappings as [`MapCodec`]s, which the
//! [`record`] builder assembles into product-type codecs with applicative
//! error aggregation.
//!
//! Encoding merges into a caller-supplied prefix; decoding returns the value
//! together with the residual (unconsumed) input. Everything propagates
//! through [`datafix_tree::DataResult`] — partial results carry warnings,
//! hard errors abort.

pub mod codec;
pub mod combinators;
pub mod either;
pub mod map_codec;
pub mod primitives;
pub mod record;

pub use codec::Codec;
pub use combinators::{
    double_range, either, float_range, int_range, list, non_empty_string, optional, pair,
};
pub use either::Either;
pub use map_codec::{DefaultFieldCodec, FieldCodec, MapAsCodec, MapCodec, OptionalFieldCodec};
pub use primitives::{BOOL, F32, F64, I16, I32, I64, I8, STRING};
pub use record::*;
