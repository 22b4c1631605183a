//! Property tests for the configuration deep merge

use kiln_config::merge_configuration;
use proptest::prelude::*;
use serde_json::{Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..5).prop_map(Value::from),
        "[a-c]{0,2}".prop_map(Value::String),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-d]", tree(), 0..5)
        .prop_map(|map| Value::Object(map.into_iter().collect()))
}

fn nulled(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.keys()
                .map(|key| (key.clone(), Value::Null))
                .collect::<Map<String, Value>>(),
        ),
        _ => Value::Null,
    }
}

fn has_duplicates(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, item)| items[i + 1..].contains(item))
}

proptest! {
    #[test]
    fn all_null_overlay_leaves_base_untouched(base in object()) {
        prop_assert_eq!(merge_configuration(&base, &nulled(&base)), base);
    }

    #[test]
    fn merging_twice_is_idempotent(base in object(), overlay in object()) {
        let once = merge_configuration(&base, &overlay);
        let twice = merge_configuration(&once, &overlay);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merged_arrays_have_no_duplicates(
        base in prop::collection::vec(leaf(), 0..6),
        overlay in prop::collection::vec(leaf(), 0..6),
    ) {
        let merged = merge_configuration(&Value::Array(base.clone()), &Value::Array(overlay));
        let items = merged.as_array().unwrap();
        prop_assert!(!has_duplicates(items));

        // Base elements keep their first-seen order at the front
        let mut first_seen: Vec<Value> = Vec::new();
        for item in &base {
            if !first_seen.contains(item) {
                first_seen.push(item.clone());
            }
        }
        prop_assert_eq!(&items[..first_seen.len()], &first_seen[..]);
    }

    #[test]
    fn null_keys_never_change_base(base in object(), key in "[a-d]") {
        let mut overlay = Map::new();
        overlay.insert(key.clone(), Value::Null);
        let merged = merge_configuration(&base, &Value::Object(overlay));
        prop_assert_eq!(merged.get(&key), base.get(&key));
    }
}
