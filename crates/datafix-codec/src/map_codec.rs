//! Map codecs: codecs that read and write entries of an existing mapping.

use datafix_tree::{DataError, DataResult, TreeOps};

use crate::codec::Codec;

/// A codec variant operating *inside* a mapping rather than producing a
/// standalone value. Field codecs and record codecs are map codecs; a map
/// codec becomes a standalone [`Codec`] through [`MapCodec::codec`], which
/// wraps it in a fresh empty map.
pub trait MapCodec: Sized {
    type Target;

    /// Writes this codec's entries into `map` (which may be `empty`).
    fn encode_entries<O: TreeOps>(
        &self,
        ops: &O,
        value: &Self::Target,
        map: O::Value,
    ) -> DataResult<O::Value>;

    /// Reads this codec's entries from `map`.
    fn decode_entries<O: TreeOps>(&self, ops: &O, map: &O::Value) -> DataResult<Self::Target>;

    /// The mapping keys this codec consumes, used to compute residual input.
    fn keys(&self) -> Vec<String>;

    /// Converts into a standalone codec over a self-contained map value.
    fn codec(self) -> MapAsCodec<Self> {
        MapAsCodec { inner: self }
    }
}

// ── Required field ──

/// Reads and writes one required mapping entry.
pub struct FieldCodec<C> {
    pub(crate) name: String,
    pub(crate) inner: C,
}

impl<C: Codec> MapCodec for FieldCodec<C> {
    type Target = C::Target;

    fn encode_entries<O: TreeOps>(
        &self,
        ops: &O,
        value: &C::Target,
        map: O::Value,
    ) -> DataResult<O::Value> {
        self.inner
            .encode_start(ops, value)
            .and_then(|encoded| ops.merge_to_map(&map, ops.string(&self.name), encoded))
    }

    fn decode_entries<O: TreeOps>(&self, ops: &O, map: &O::Value) -> DataResult<C::Target> {
        match ops.get(map, &self.name) {
            None => DataResult::error(DataError::FieldMissing(self.name.clone())),
            Some(entry) => self.inner.parse(ops, &entry).map_err(|e| match e {
                missing @ DataError::FieldMissing(_) => missing,
                other => DataError::Codec(format!("field '{}': {other}", self.name)),
            }),
        }
    }

    fn keys(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

// ── Optional field ──

/// Reads and writes one optional mapping entry; absence decodes to `None`.
/// A present-but-unreadable entry is a soft failure.
pub struct OptionalFieldCodec<C> {
    pub(crate) name: String,
    pub(crate) inner: C,
}

impl<C: Codec> MapCodec for OptionalFieldCodec<C> {
    type Target = Option<C::Target>;

    fn encode_entries<O: TreeOps>(
        &self,
        ops: &O,
        value: &Option<C::Target>,
        map: O::Value,
    ) -> DataResult<O::Value> {
        match value {
            None => DataResult::ok(map),
            Some(v) => self
                .inner
                .encode_start(ops, v)
                .and_then(|encoded| ops.merge_to_map(&map, ops.string(&self.name), encoded)),
        }
    }

    fn decode_entries<O: TreeOps>(&self, ops: &O, map: &O::Value) -> DataResult<Option<C::Target>> {
        match ops.get(map, &self.name) {
            None => DataResult::ok(None),
            Some(entry) => match self.inner.parse(ops, &entry) {
                DataResult::Ok(v) => DataResult::ok(Some(v)),
                DataResult::Partial { value, errors } => DataResult::partial(Some(value), errors),
                DataResult::Err(e) => DataResult::partial(
                    None,
                    vec![format!("optional field '{}': {e}", self.name)],
                ),
            },
        }
    }

    fn keys(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

// ── Optional field with default ──

/// Like [`OptionalFieldCodec`] but supplies a default on read and always
/// re-emits the value on encode, even when it equals the default.
pub struct DefaultFieldCodec<C: Codec> {
    pub(crate) name: String,
    pub(crate) inner: C,
    pub(crate) default: C::Target,
}

impl<C: Codec> MapCodec for DefaultFieldCodec<C>
where
    C::Target: Clone,
{
    type Target = C::Target;

    fn encode_entries<O: TreeOps>(
        &self,
        ops: &O,
        value: &C::Target,
        map: O::Value,
    ) -> DataResult<O::Value> {
        self.inner
            .encode_start(ops, value)
            .and_then(|encoded| ops.merge_to_map(&map, ops.string(&self.name), encoded))
    }

    fn decode_entries<O: TreeOps>(&self, ops: &O, map: &O::Value) -> DataResult<C::Target> {
        match ops.get(map, &self.name) {
            None => DataResult::ok(self.default.clone()),
            Some(entry) => match self.inner.parse(ops, &entry) {
                DataResult::Err(e) => DataResult::partial(
                    self.default.clone(),
                    vec![format!("optional field '{}': {e}", self.name)],
                ),
                other => other,
            },
        }
    }

    fn keys(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

// ── Standalone wrapper ──

/// A [`MapCodec`] lifted to a standalone [`Codec`] over its own map value.
pub struct MapAsCodec<M> {
    pub(crate) inner: M,
}

impl<M: MapCodec> Codec for MapAsCodec<M> {
    type Target = M::Target;

    fn encode<O: TreeOps>(
        &self,
        ops: &O,
        value: &M::Target,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        let map = if ops.is_null(&prefix) {
            ops.empty_map()
        } else if ops.is_map(&prefix) {
            prefix
        } else {
            return DataResult::error(DataError::Codec(format!(
                "cannot merge map entries into prefix {prefix:?}"
            )));
        };
        self.inner.encode_entries(ops, value, map)
    }

    fn decode<O: TreeOps>(&self, ops: &O, input: &O::Value) -> DataResult<(M::Target, O::Value)> {
        if !ops.is_map(input) {
            return DataResult::error(DataError::TypeMismatch {
                expected: "map",
                found: format!("{input:?}"),
            });
        }
        self.inner.decode_entries(ops, input).map(|value| {
            let mut residual = input.clone();
            for key in self.inner.keys() {
                residual = ops.remove(&residual, &key);
            }
            (value, residual)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{I32, STRING};
    use datafix_formats::JsonOps;
    use serde_json::json;

    #[test]
    fn test_field_roundtrip() {
        let ops = JsonOps;
        let codec = STRING.field_of("name").codec();
        let encoded = codec
            .encode_start(&ops, &"svc".to_string())
            .into_result()
            .unwrap();
        assert_eq!(encoded, json!({"name": "svc"}));
        assert_eq!(
            codec.parse(&ops, &encoded),
            DataResult::Ok("svc".to_string())
        );
    }

    #[test]
    fn test_field_missing_is_hard() {
        let ops = JsonOps;
        let codec = STRING.field_of("name").codec();
        assert_eq!(
            codec.parse(&ops, &json!({})),
            DataResult::Err(DataError::FieldMissing("name".to_string()))
        );
    }

    #[test]
    fn test_field_error_carries_name() {
        let ops = JsonOps;
        let codec = I32.field_of("count").codec();
        match codec.parse(&ops, &json!({"count": "x"})) {
            DataResult::Err(DataError::Codec(msg)) => assert!(msg.contains("'count'")),
            other => panic!("expected codec error, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_field_absent() {
        let ops = JsonOps;
        let codec = I32.optional_field_of("timeout").codec();
        assert_eq!(codec.parse(&ops, &json!({})), DataResult::Ok(None));
    }

    #[test]
    fn test_optional_field_invalid_is_soft() {
        let ops = JsonOps;
        let codec = I32.optional_field_of("timeout").codec();
        let result = codec.parse(&ops, &json!({"timeout": []}));
        assert!(result.is_partial());
        assert_eq!(result.value(), Some(&None));
    }

    #[test]
    fn test_optional_field_none_is_omitted() {
        let ops = JsonOps;
        let codec = I32.optional_field_of("timeout").codec();
        let encoded = codec.encode_start(&ops, &None).into_result().unwrap();
        assert_eq!(encoded, json!({}));
    }

    #[test]
    fn test_default_field_supplies_default() {
        let ops = JsonOps;
        let codec = I32.optional_field_of_or("timeout", 30).codec();
        assert_eq!(codec.parse(&ops, &json!({})), DataResult::Ok(30));
        assert_eq!(codec.parse(&ops, &json!({"timeout": 5})), DataResult::Ok(5));
    }

    #[test]
    fn test_default_field_always_emits() {
        let ops = JsonOps;
        let codec = I32.optional_field_of_or("timeout", 30).codec();
        let encoded = codec.encode_start(&ops, &30).into_result().unwrap();
        assert_eq!(encoded, json!({"timeout": 30}));
    }

    #[test]
    fn test_map_as_codec_residual_excludes_consumed() {
        let ops = JsonOps;
        let codec = STRING.field_of("name").codec();
        let input = json!({"name": "svc", "extra": 1});
        match codec.decode(&ops, &input) {
            DataResult::Ok((value, residual)) => {
                assert_eq!(value, "svc");
                assert_eq!(residual, json!({"extra": 1}));
            }
            other => panic!("expected ok, got {other:?}"),
        }
    }

    #[test]
    fn test_map_as_codec_rejects_non_map() {
        let ops = JsonOps;
        let codec = STRING.field_of("name").codec();
        assert!(codec.parse(&ops, &json!(5)).is_err());
    }
}
