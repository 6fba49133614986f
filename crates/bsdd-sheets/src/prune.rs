//! Null pruning
//!
//! Removes `null` entries from arrays and `null`-valued keys from objects, at
//! every depth. Containers left empty by pruning are kept. Surviving entries
//! keep their order, and pruning a pruned tree changes nothing.

use serde_json::Value;

/// Return `value` with every null field and entry removed
pub fn prune_nulls(mut value: Value) -> Value {
    prune_nulls_in_place(&mut value);
    value
}

/// Remove every null field and entry from `value` in place. A top-level
/// `null` has no container to be removed from and is left as is.
pub fn prune_nulls_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(prune_nulls_in_place);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(prune_nulls_in_place);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_prunes_fields_and_entries() {
        assert_eq!(
            prune_nulls(json!({"A": null, "B": [1, null, 2]})),
            json!({"B": [1, 2]})
        );
    }

    #[test]
    fn test_nested_and_empty_containers() {
        let pruned = prune_nulls(json!({
            "Code": "wall",
            "Name": null,
            "ClassificationProperties": [
                {"Code": "p", "Unit": null, "AllowedValues": [null]},
                null,
            ],
            "ClassificationRelations": [],
            "Meta": {"only": null},
        }));

        assert_eq!(
            pruned,
            json!({
                "Code": "wall",
                "ClassificationProperties": [{"Code": "p", "AllowedValues": []}],
                "ClassificationRelations": [],
                "Meta": {},
            })
        );
    }

    #[test]
    fn test_keeps_order() {
        let pruned = prune_nulls(json!({"z": 1, "a": null, "m": 2, "b": 3}));
        let keys: Vec<&String> = pruned.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "m", "b"]);
    }

    #[test]
    fn test_scalars_untouched() {
        assert_eq!(prune_nulls(Value::Null), Value::Null);
        assert_eq!(prune_nulls(json!(false)), json!(false));
        assert_eq!(prune_nulls(json!("")), json!(""));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-e]", inner), 0..6)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    fn contains_nested_null(value: &Value) -> bool {
        match value {
            Value::Object(map) => map.values().any(|v| v.is_null() || contains_nested_null(v)),
            Value::Array(items) => items.iter().any(|v| v.is_null() || contains_nested_null(v)),
            _ => false,
        }
    }

    proptest! {
        #[test]
        fn prop_prune_is_idempotent(value in arb_json()) {
            let once = prune_nulls(value);
            let twice = prune_nulls(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_no_nulls_survive(value in arb_json()) {
            prop_assert!(!contains_nested_null(&prune_nulls(value)));
        }
    }
}
