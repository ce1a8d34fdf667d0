//! Record codecs: applicative product construction over map codecs.
//!
//! `recordN(ctor, (field1, getter1), …, (fieldN, getterN))` builds a
//! [`MapCodec`] for a product type. Encoding threads the partial map through
//! the fields left-to-right and short-circuits on the first hard error.
//! Decoding reads every field from the same input map; the constructor runs
//! only when all fields succeed, and hard failures aggregate their messages.
//! Arities 1 through 16 are generated.

use datafix_tree::{DataError, DataResult, TreeOps};

use crate::map_codec::MapCodec;

macro_rules! record_codec {
    ($(#[$meta:meta])* $fname:ident, $sname:ident, $(($C:ident, $G:ident, $c:ident)),+) => {
        $(#[$meta])*
        pub struct $sname<Out, F, $($C, $G),+> {
            ctor: F,
            $($c: ($C, $G),)+
            _marker: std::marker::PhantomData<fn() -> Out>,
        }

        $(#[$meta])*
        pub fn $fname<Out, F, $($C, $G),+>(ctor: F, $($c: ($C, $G)),+) -> $sname<Out, F, $($C, $G),+>
        where
            F: Fn($($C::Target),+) -> Out,
            $($C: MapCodec, $G: Fn(&Out) -> $C::Target,)+
        {
            $sname {
                ctor,
                $($c,)+
                _marker: std::marker::PhantomData,
            }
        }

        impl<Out, F, $($C, $G),+> MapCodec for $sname<Out, F, $($C, $G),+>
        where
            F: Fn($($C::Target),+) -> Out,
            $($C: MapCodec, $G: Fn(&Out) -> $C::Target,)+
        {
            type Target = Out;

            fn encode_entries<O: TreeOps>(
                &self,
                ops: &O,
                value: &Out,
                map: O::Value,
            ) -> DataResult<O::Value> {
                let mut warnings = Vec::new();
                let mut acc = map;
                $(
                    match self.$c.0.encode_entries(ops, &(self.$c.1)(value), acc) {
                        DataResult::Ok(next) => acc = next,
                        DataResult::Partial { value: next, errors } => {
                            warnings.extend(errors);
                            acc = next;
                        }
                        DataResult::Err(e) => return DataResult::Err(e),
                    }
                )+
                DataResult::partial(acc, warnings)
            }

            fn decode_entries<O: TreeOps>(&self, ops: &O, map: &O::Value) -> DataResult<Out> {
                let mut warnings: Vec<String> = Vec::new();
                let mut failures: Vec<String> = Vec::new();
                $(
                    let $c = match self.$c.0.decode_entries(ops, map) {
                        DataResult::Ok(v) => Some(v),
                        DataResult::Partial { value, errors } => {
                            warnings.extend(errors);
                            Some(value)
                        }
                        DataResult::Err(e) => {
                            failures.push(e.to_string());
                            None
                        }
                    };
                )+
                if !failures.is_empty() {
                    return DataResult::Err(DataError::Codec(failures.join("; ")));
                }
                match ($($c,)+) {
                    ($(Some($c),)+) => DataResult::partial((self.ctor)($($c),+), warnings),
                    // empty `failures` guarantees every field carries a value
                    _ => unreachable!(),
                }
            }

            fn keys(&self) -> Vec<String> {
                let mut keys = Vec::new();
                $(keys.extend(self.$c.0.keys());)+
                keys
            }
        }
    };
}

record_codec!(
    /// One-field record codec.
    record1, RecordCodec1, (C1, G1, c1));
record_codec!(
    /// Two-field record codec.
    record2, RecordCodec2, (C1, G1, c1), (C2, G2, c2));
record_codec!(
    /// Three-field record codec.
    record3, RecordCodec3, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3));
record_codec!(
    /// Four-field record codec.
    record4, RecordCodec4, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4));
record_codec!(
    /// Five-field record codec.
    record5, RecordCodec5, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5));
record_codec!(
    /// Six-field record codec.
    record6, RecordCodec6, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6));
record_codec!(
    /// Seven-field record codec.
    record7, RecordCodec7, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7));
record_codec!(
    /// Eight-field record codec.
    record8, RecordCodec8, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8));
record_codec!(
    /// Nine-field record codec.
    record9, RecordCodec9, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8), (C9, G9, c9));
record_codec!(
    /// Ten-field record codec.
    record10, RecordCodec10, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8), (C9, G9, c9), (C10, G10, c10));
record_codec!(
    /// Eleven-field record codec.
    record11, RecordCodec11, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8), (C9, G9, c9), (C10, G10, c10), (C11, G11, c11));
record_codec!(
    /// Twelve-field record codec.
    record12, RecordCodec12, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8), (C9, G9, c9), (C10, G10, c10), (C11, G11, c11),
    (C12, G12, c12));
record_codec!(
    /// Thirteen-field record codec.
    record13, RecordCodec13, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8), (C9, G9, c9), (C10, G10, c10), (C11, G11, c11),
    (C12, G12, c12), (C13, G13, c13));
record_codec!(
    /// Fourteen-field record codec.
    record14, RecordCodec14, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8), (C9, G9, c9), (C10, G10, c10), (C11, G11, c11),
    (C12, G12, c12), (C13, G13, c13), (C14, G14, c14));
record_codec!(
    /// Fifteen-field record codec.
    record15, RecordCodec15, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8), (C9, G9, c9), (C10, G10, c10), (C11, G11, c11),
    (C12, G12, c12), (C13, G13, c13), (C14, G14, c14), (C15, G15, c15));
record_codec!(
    /// Sixteen-field record codec.
    record16, RecordCodec16, (C1, G1, c1), (C2, G2, c2), (C3, G3, c3), (C4, G4, c4), (C5, G5, c5),
    (C6, G6, c6), (C7, G7, c7), (C8, G8, c8), (C9, G9, c9), (C10, G10, c10), (C11, G11, c11),
    (C12, G12, c12), (C13, G13, c13), (C14, G14, c14), (C15, G15, c15), (C16, G16, c16));
