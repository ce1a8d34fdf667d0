//! Property-based tests for template decode/encode stability.

use datafix_formats::JsonOps;
use datafix_schema::{DataVersion, Schema, TypeRef, TypeTemplate};
use datafix_tree::Dynamic;
use proptest::prelude::*;
use serde_json::json;

fn player_schema() -> std::sync::Arc<Schema> {
    let mut builder = Schema::builder(DataVersion::new(1));
    builder
        .register(
            TypeRef::new("player"),
            TypeTemplate::and(vec![
                TypeTemplate::field("name", TypeTemplate::Str),
                TypeTemplate::field("experience", TypeTemplate::I32),
                TypeTemplate::Remainder,
            ]),
        )
        .unwrap();
    builder.build()
}

/// Opaque remainder entries: keys disjoint from the declared fields.
fn remainder_entries() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec(("[a-d][a-z]{2,8}", any::<i64>()), 0..8).prop_map(|entries| {
        let mut seen = std::collections::HashSet::new();
        entries
            .into_iter()
            .filter(|(k, _)| k != "name" && k != "experience" && seen.insert(k.clone()))
            .collect()
    })
}

proptest! {
    /// Decoding never changes declared fields, and encoding re-emits every
    /// remainder entry in its original relative order.
    #[test]
    fn remainder_round_trips_in_order(
        name in "[a-z]{1,10}",
        experience in any::<i32>(),
        extras in remainder_entries(),
    ) {
        let schema = player_schema();
        let data_type = schema.get_type(&TypeRef::new("player")).unwrap();

        let mut body = json!({"name": name, "experience": experience});
        for (key, value) in &extras {
            body.as_object_mut().unwrap().insert(key.clone(), json!(value));
        }

        let typed = data_type
            .decode(&schema, &Dynamic::new(JsonOps, body.clone()))
            .into_result()
            .unwrap();
        let encoded = data_type
            .encode(&schema, typed.dynamic())
            .into_result()
            .unwrap();

        // declared fields first, in template order
        let keys: Vec<String> = encoded
            .value()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        prop_assert_eq!(&keys[0], "name");
        prop_assert_eq!(&keys[1], "experience");

        // remainder entries preserved, values untouched, order kept
        let extra_keys: Vec<&String> = keys.iter().skip(2).collect();
        let expected_keys: Vec<&String> = extras.iter().map(|(k, _)| k).collect();
        prop_assert_eq!(extra_keys, expected_keys);
        for (key, value) in &extras {
            prop_assert_eq!(encoded.value().get(key.as_str()), Some(&json!(value)));
        }
    }

    /// Encoding an already-encoded value is a fixed point.
    #[test]
    fn encode_is_idempotent(
        name in "[a-z]{1,10}",
        experience in any::<i32>(),
        extras in remainder_entries(),
    ) {
        let schema = player_schema();
        let data_type = schema.get_type(&TypeRef::new("player")).unwrap();

        let mut body = json!({"name": name, "experience": experience});
        for (key, value) in &extras {
            body.as_object_mut().unwrap().insert(key.clone(), json!(value));
        }

        let once = data_type
            .encode(&schema, &Dynamic::new(JsonOps, body))
            .into_result()
            .unwrap();
        let twice = data_type.encode(&schema, &once).into_result().unwrap();
        prop_assert_eq!(once.value(), twice.value());
    }

    /// Decode never panics on arbitrary JSON shapes; mismatches are errors.
    #[test]
    fn decode_never_panics(body in arbitrary_json(3)) {
        let schema = player_schema();
        let data_type = schema.get_type(&TypeRef::new("player")).unwrap();
        let _ = data_type.decode(&schema, &Dynamic::new(JsonOps, body));
    }
}

fn arbitrary_json(depth: u32) -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i32>().prop_map(serde_json::Value::from),
        "[a-z]{0,8}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(depth, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(serde_json::Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4).prop_map(|entries| {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key, value);
                }
                serde_json::Value::Object(map)
            }),
        ]
    })
}
