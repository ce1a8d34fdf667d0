//! Primitive codecs: booleans, the integer palette, floats, strings.

use datafix_tree::{DataError, DataResult, TreeOps};

use crate::codec::{merge_primitive, Codec};

pub const BOOL: BoolCodec = BoolCodec;
pub const I8: I8Codec = I8Codec;
pub const I16: I16Codec = I16Codec;
pub const I32: I32Codec = I32Codec;
pub const I64: I64Codec = I64Codec;
pub const F32: F32Codec = F32Codec;
pub const F64: F64Codec = F64Codec;
pub const STRING: StringCodec = StringCodec;

#[derive(Debug, Clone, Copy)]
pub struct BoolCodec;

impl Codec for BoolCodec {
    type Target = bool;

    fn encode<O: TreeOps>(&self, ops: &O, value: &bool, prefix: O::Value) -> DataResult<O::Value> {
        merge_primitive(ops, prefix, ops.bool(*value))
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(bool, O::Value)> {
        ops.as_bool(input).map(|b| (b, ops.empty()))
    }
}

/// Reads a number and checks it is integral and within the given bounds.
fn integral_in_range<O: TreeOps>(
    ops: &O,
    input: &O::Value,
    expected: &'static str,
    min: f64,
    max: f64,
) -> DataResult<i64> {
    ops.as_number(input).and_then(|n| {
        if n.fract() != 0.0 || n < min || n > max {
            DataResult::error(DataError::TypeMismatch {
                expected,
                found: format!("{input:?}"),
            })
        } else {
            DataResult::ok(n as i64)
        }
    })
}

macro_rules! int_codec {
    ($name:ident, $ty:ty, $ctor:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Codec for $name {
            type Target = $ty;

            fn encode<O: TreeOps>(
                &self,
                ops: &O,
                value: &$ty,
                prefix: O::Value,
            ) -> DataResult<O::Value> {
                merge_primitive(ops, prefix, ops.$ctor(*value))
            }

            fn decode<O: TreeOps>(
                &self,
                ops: &O,
                input: &O::Value,
            ) -> DataResult<($ty, O::Value)> {
                integral_in_range(ops, input, $label, <$ty>::MIN as f64, <$ty>::MAX as f64)
                    .map(|n| (n as $ty, ops.empty()))
            }
        }
    };
}

int_codec!(I8Codec, i8, i8, "i8");
int_codec!(I16Codec, i16, i16, "i16");
int_codec!(I32Codec, i32, i32, "i32");
int_codec!(I64Codec, i64, i64, "i64");

#[derive(Debug, Clone, Copy)]
pub struct F32Codec;

impl Codec for F32Codec {
    type Target = f32;

    fn encode<O: TreeOps>(&self, ops: &O, value: &f32, prefix: O::Value) -> DataResult<O::Value> {
        ops.f32_checked(*value)
            .and_then(|v| merge_primitive(ops, prefix, v))
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(f32, O::Value)> {
        ops.as_number(input).map(|n| (n as f32, ops.empty()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct F64Codec;

impl Codec for F64Codec {
    type Target = f64;

    fn encode<O: TreeOps>(&self, ops: &O, value: &f64, prefix: O::Value) -> DataResult<O::Value> {
        ops.f64_checked(*value)
            .and_then(|v| merge_primitive(ops, prefix, v))
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(f64, O::Value)> {
        ops.as_number(input).map(|n| (n, ops.empty()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringCodec;

impl Codec for StringCodec {
    type Target = String;

    fn encode<O: TreeOps>(
        &self,
        ops: &O,
        value: &String,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        merge_primitive(ops, prefix, ops.string(value))
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(String, O::Value)> {
        ops.as_string(input).map(|s| (s, ops.empty()))
    }
}
