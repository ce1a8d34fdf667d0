//! Codec combinators: lists, options, alternatives, pairs, mapped and
//! bounded codecs.

use datafix_tree::{DataError, DataResult, TreeOps};

use crate::codec::Codec;
use crate::either::Either;
use crate::primitives::{F32Codec, F64Codec, I32Codec, StringCodec};

/// A codec for ordered sequences of `element`'s target.
pub fn list<C: Codec>(element: C) -> ListCodec<C> {
    element.list_of()
}

/// A codec for optional values.
pub fn optional<C: Codec>(inner: C) -> OptionalCodec<C> {
    inner.optional_of()
}

/// A codec trying `left` first, then `right`.
pub fn either<L: Codec, R: Codec>(left: L, right: R) -> EitherCodec<L, R> {
    EitherCodec { left, right }
}

/// A codec for pairs, threading the residual from first to second.
pub fn pair<F: Codec, S: Codec>(first: F, second: S) -> PairCodec<F, S> {
    PairCodec { first, second }
}

/// An i32 codec accepting only values in `[min, max]`, validated on both
/// encode and decode.
pub fn int_range(min: i32, max: i32) -> RangedIntCodec {
    RangedIntCodec { min, max }
}

/// An f32 codec accepting only values in `[min, max]`.
pub fn float_range(min: f32, max: f32) -> RangedFloatCodec {
    RangedFloatCodec { min, max }
}

/// An f64 codec accepting only values in `[min, max]`.
pub fn double_range(min: f64, max: f64) -> RangedDoubleCodec {
    RangedDoubleCodec { min, max }
}

/// A string codec rejecting the empty string.
pub fn non_empty_string() -> NonEmptyStringCodec {
    NonEmptyStringCodec
}

// ── List ──

#[derive(Debug, Clone, Copy)]
pub struct ListCodec<C> {
    pub(crate) element: C,
}

impl<C: Codec> Codec for ListCodec<C> {
    type Target = Vec<C::Target>;

    fn encode<O: TreeOps>(
        &self,
        ops: &O,
        value: &Vec<C::Target>,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        let mut acc = if ops.is_null(&prefix) {
            ops.empty_list()
        } else if ops.is_list(&prefix) {
            prefix
        } else {
            return DataResult::error(DataError::Codec(format!(
                "cannot merge list into prefix {prefix:?}"
            )));
        };
        let mut warnings = Vec::new();
        for item in value {
            match self.element.encode_start(ops, item) {
                DataResult::Ok(encoded) => match ops.merge_to_list(&acc, encoded) {
                    DataResult::Ok(next) => acc = next,
                    DataResult::Partial { value, errors } => {
                        warnings.extend(errors);
                        acc = value;
                    }
                    DataResult::Err(e) => return DataResult::Err(e),
                },
                DataResult::Partial {
                    value: encoded,
                    errors,
                } => {
                    warnings.extend(errors);
                    match ops.merge_to_list(&acc, encoded) {
                        DataResult::Ok(next) => acc = next,
                        DataResult::Partial { value, errors } => {
                            warnings.extend(errors);
                            acc = value;
                        }
                        DataResult::Err(e) => return DataResult::Err(e),
                    }
                }
                DataResult::Err(e) => return DataResult::Err(e),
            }
        }
        DataResult::partial(acc, warnings)
    }

    fn decode<O: TreeOps>(
        &self,
        ops: &O,
        input: &O::Value,
    ) -> DataResult<(Vec<C::Target>, O::Value)> {
        ops.list_items(input).and_then(|items| {
            let mut decoded = Vec::with_capacity(items.len());
            let mut warnings = Vec::new();
            for (index, item) in items.iter().enumerate() {
                match self.element.parse(ops, item) {
                    DataResult::Ok(v) => decoded.push(v),
                    DataResult::Partial { value, errors } => {
                        warnings.extend(errors);
                        decoded.push(value);
                    }
                    DataResult::Err(e) => {
                        warnings.push(format!("skipping list element {index}: {e}"));
                    }
                }
            }
            DataResult::partial((decoded, ops.empty()), warnings)
        })
    }
}

// ── Optional ──

#[derive(Debug, Clone, Copy)]
pub struct OptionalCodec<C> {
    pub(crate) inner: C,
}

impl<C: Codec> Codec for OptionalCodec<C> {
    type Target = Option<C::Target>;

    fn encode<O: TreeOps>(
        &self,
        ops: &O,
        value: &Option<C::Target>,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        match value {
            Some(v) => self.inner.encode(ops, v, prefix),
            None => DataResult::ok(prefix),
        }
    }

    fn decode<O: TreeOps>(
        &self,
        ops: &O,
        input: &O::Value,
    ) -> DataResult<(Option<C::Target>, O::Value)> {
        if ops.is_null(input) {
            return DataResult::ok((None, ops.empty()));
        }
        match self.inner.decode(ops, input) {
            DataResult::Ok((v, residual)) => DataResult::ok((Some(v), residual)),
            DataResult::Partial {
                value: (v, residual),
                errors,
            } => DataResult::partial((Some(v), residual), errors),
            DataResult::Err(e) => {
                DataResult::partial((None, ops.empty()), vec![e.to_string()])
            }
        }
    }
}

// ── Either ──

#[derive(Debug, Clone, Copy)]
pub struct EitherCodec<L, R> {
    left: L,
    right: R,
}

impl<L: Codec, R: Codec> Codec for EitherCodec<L, R> {
    type Target = Either<L::Target, R::Target>;

    fn encode<O: TreeOps>(
        &self,
        ops: &O,
        value: &Self::Target,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        match value {
            Either::Left(l) => self.left.encode(ops, l, prefix),
            Either::Right(r) => self.right.encode(ops, r, prefix),
        }
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(Self::Target, O::Value)> {
        match self.left.decode(ops, input) {
            DataResult::Err(left_err) => match self.right.decode(ops, input) {
                DataResult::Err(right_err) => DataResult::error(DataError::Codec(format!(
                    "no alternative matched: {left_err}; {right_err}"
                ))),
                other => other.map(|(v, residual)| (Either::Right(v), residual)),
            },
            other => other.map(|(v, residual)| (Either::Left(v), residual)),
        }
    }
}

// ── Pair ──

#[derive(Debug, Clone, Copy)]
pub struct PairCodec<F, S> {
    first: F,
    second: S,
}

impl<F: Codec, S: Codec> Codec for PairCodec<F, S> {
    type Target = (F::Target, S::Target);

    fn encode<O: TreeOps>(
        &self,
        ops: &O,
        value: &Self::Target,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        self.first
            .encode(ops, &value.0, prefix)
            .and_then(|partial| self.second.encode(ops, &value.1, partial))
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(Self::Target, O::Value)> {
        self.first.decode(ops, input).and_then(|(a, residual)| {
            self.second
                .decode(ops, &residual)
                .map(|(b, rest)| ((a, b), rest))
        })
    }
}

// ── Mapped codecs ──

pub struct Xmap<C, F, G, B> {
    pub(crate) inner: C,
    pub(crate) to: F,
    pub(crate) from: G,
    pub(crate) _marker: std::marker::PhantomData<fn() -> B>,
}

impl<C, F, G, B> Codec for Xmap<C, F, G, B>
where
    C: Codec,
    F: Fn(&C::Target) -> B,
    G: Fn(&B) -> C::Target,
{
    type Target = B;

    fn encode<O: TreeOps>(&self, ops: &O, value: &B, prefix: O::Value) -> DataResult<O::Value> {
        self.inner.encode(ops, &(self.from)(value), prefix)
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.inner
            .decode(ops, input)
            .map(|(v, residual)| ((self.to)(&v), residual))
    }
}

pub struct FlatXmap<C, F, G, B> {
    pub(crate) inner: C,
    pub(crate) to: F,
    pub(crate) from: G,
    pub(crate) _marker: std::marker::PhantomData<fn() -> B>,
}

impl<C, F, G, B> Codec for FlatXmap<C, F, G, B>
where
    C: Codec,
    F: Fn(&C::Target) -> DataResult<B>,
    G: Fn(&B) -> DataResult<C::Target>,
{
    type Target = B;

    fn encode<O: TreeOps>(&self, ops: &O, value: &B, prefix: O::Value) -> DataResult<O::Value> {
        (self.from)(value).and_then(|v| self.inner.encode(ops, &v, prefix))
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.inner
            .decode(ops, input)
            .and_then(|(v, residual)| (self.to)(&v).map(|b| (b, residual)))
    }
}

// ── Bounded codecs ──

#[derive(Debug, Clone, Copy)]
pub struct RangedIntCodec {
    min: i32,
    max: i32,
}

impl Codec for RangedIntCodec {
    type Target = i32;

    fn encode<O: TreeOps>(&self, ops: &O, value: &i32, prefix: O::Value) -> DataResult<O::Value> {
        if *value < self.min || *value > self.max {
            return DataResult::error(DataError::range_violation(value, self.min, self.max));
        }
        I32Codec.encode(ops, value, prefix)
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(i32, O::Value)> {
        I32Codec.decode(ops, input).and_then(|(v, residual)| {
            if v < self.min || v > self.max {
                DataResult::error(DataError::range_violation(v, self.min, self.max))
            } else {
                DataResult::ok((v, residual))
            }
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RangedFloatCodec {
    min: f32,
    max: f32,
}

impl Codec for RangedFloatCodec {
    type Target = f32;

    fn encode<O: TreeOps>(&self, ops: &O, value: &f32, prefix: O::Value) -> DataResult<O::Value> {
        if !(*value >= self.min && *value <= self.max) {
            return DataResult::error(DataError::range_violation(value, self.min, self.max));
        }
        F32Codec.encode(ops, value, prefix)
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(f32, O::Value)> {
        F32Codec.decode(ops, input).and_then(|(v, residual)| {
            if v >= self.min && v <= self.max {
                DataResult::ok((v, residual))
            } else {
                DataResult::error(DataError::range_violation(v, self.min, self.max))
            }
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RangedDoubleCodec {
    min: f64,
    max: f64,
}

impl Codec for RangedDoubleCodec {
    type Target = f64;

    fn encode<O: TreeOps>(&self, ops: &O, value: &f64, prefix: O::Value) -> DataResult<O::Value> {
        if !(*value >= self.min && *value <= self.max) {
            return DataResult::error(DataError::range_violation(value, self.min, self.max));
        }
        F64Codec.encode(ops, value, prefix)
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(f64, O::Value)> {
        F64Codec.decode(ops, input).and_then(|(v, residual)| {
            if v >= self.min && v <= self.max {
                DataResult::ok((v, residual))
            } else {
                DataResult::error(DataError::range_violation(v, self.min, self.max))
            }
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NonEmptyStringCodec;

impl Codec for NonEmptyStringCodec {
    type Target = String;

    fn encode<O: TreeOps>(
        &self,
        ops: &O,
        value: &String,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        if value.is_empty() {
            return DataResult::error(DataError::Codec("expected non-empty string".to_string()));
        }
        StringCodec.encode(ops, value, prefix)
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(String, O::Value)> {
        StringCodec.decode(ops, input).and_then(|(s, residual)| {
            if s.is_empty() {
                DataResult::error(DataError::Codec("expected non-empty string".to_string()))
            } else {
                DataResult::ok((s, residual))
            }
        })
    }
}
