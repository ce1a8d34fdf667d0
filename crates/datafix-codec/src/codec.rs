//! The `Codec` trait and its derived combinator methods.

use datafix_tree::{DataError, DataResult, TreeOps};

use crate::combinators::{FlatXmap, ListCodec, OptionalCodec, Xmap};
use crate::map_codec::{DefaultFieldCodec, FieldCodec, OptionalFieldCodec};

/// Typed bidirectional translation between domain values of `Target` and
/// tree values, parameterized over any [`TreeOps`].
pub trait Codec: Sized {
    /// The domain type this codec reads and writes.
    type Target;

    /// Encodes `value`, merging the encoded form into `prefix`.
    ///
    /// `prefix` is either `ops.empty()` or a map under construction; merging
    /// a primitive into a non-empty prefix is an error.
    fn encode<O: TreeOps>(
        &self,
        ops: &O,
        value: &Self::Target,
        prefix: O::Value,
    ) -> DataResult<O::Value>;

    /// Decodes a value from `input`, returning it together with the residual
    /// (unconsumed) part of the input.
    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value)
        -> DataResult<(Self::Target, O::Value)>;

    /// Decodes and drops the residual.
    fn parse<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<Self::Target> {
        self.decode(ops, input).map(|(value, _)| value)
    }

    /// Encodes starting from an empty prefix.
    fn encode_start<O: TreeOps>(&self, ops: &O, value: &Self::Target) -> DataResult<O::Value> {
        let prefix = ops.empty();
        self.encode(ops, value, prefix)
    }

    /// A codec for ordered sequences of this codec's target.
    fn list_of(self) -> ListCodec<Self> {
        ListCodec { element: self }
    }

    /// A codec for optional values; absence decodes to `None`.
    fn optional_of(self) -> OptionalCodec<Self> {
        OptionalCodec { inner: self }
    }

    /// Maps the target type through an infallible isomorphism.
    fn xmap<B, F, G>(self, to: F, from: G) -> Xmap<Self, F, G, B>
    where
        F: Fn(&Self::Target) -> B,
        G: Fn(&B) -> Self::Target,
    {
        Xmap {
            inner: self,
            to,
            from,
            _marker: std::marker::PhantomData,
        }
    }

    /// Maps the target type through a fallible isomorphism; either direction
    /// may reject a value.
    fn flat_xmap<B, F, G>(self, to: F, from: G) -> FlatXmap<Self, F, G, B>
    where
        F: Fn(&Self::Target) -> DataResult<B>,
        G: Fn(&B) -> DataResult<Self::Target>,
    {
        FlatXmap {
            inner: self,
            to,
            from,
            _marker: std::marker::PhantomData,
        }
    }

    /// Projects this codec into a required mapping entry under `name`.
    fn field_of(self, name: &str) -> FieldCodec<Self> {
        FieldCodec {
            name: name.to_string(),
            inner: self,
        }
    }

    /// Projects into an optional mapping entry; absence decodes to `None`.
    fn optional_field_of(self, name: &str) -> OptionalFieldCodec<Self> {
        OptionalFieldCodec {
            name: name.to_string(),
            inner: self,
        }
    }

    /// Projects into an optional mapping entry with a default. The default is
    /// supplied on read when the entry is absent, and is always re-emitted on
    /// encode, even when the in-memory value equals it.
    fn optional_field_of_or(self, name: &str, default: Self::Target) -> DefaultFieldCodec<Self>
    where
        Self::Target: Clone,
    {
        DefaultFieldCodec {
            name: name.to_string(),
            inner: self,
            default,
        }
    }
}

/// Merges a freshly built primitive into `prefix`. Only an empty prefix
/// accepts a primitive.
pub(crate) fn merge_primitive<O: TreeOps>(
    ops: &O,
    prefix: O::Value,
    value: O::Value,
) -> DataResult<O::Value> {
    if ops.is_null(&prefix) {
        DataResult::ok(value)
    } else {
        DataResult::error(DataError::Codec(format!(
            "cannot merge primitive into non-empty prefix {prefix:?}"
        )))
    }
}
