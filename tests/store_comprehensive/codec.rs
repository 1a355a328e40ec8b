//! Value codec and tree snapshot properties.

use crate::common::*;
use configx::{decode, decode_tree, encode, encode_tree, ConfigTree};
use proptest::prelude::*;

fn arb_json_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(
        "[a-z]{1,6}",
        any::<f64>()
            .prop_filter("JSON has no non-finite numbers", |f| f.is_finite())
            .prop_map(serde_json::Value::from),
        1..4,
    )
    .prop_map(|fields| Value::Json(serde_json::Value::Object(fields.into_iter().collect())))
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<f64>()
            .prop_filter("NaN never equals itself", |f| !f.is_nan())
            .prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
        "\\PC{0,12}".prop_map(Value::Str),
        arb_json_object(),
    ];
    leaf.prop_recursive(6, 64, 8, |inner| {
        prop::collection::vec(inner, 0..8).prop_map(Value::List)
    })
}

proptest! {
    #[test]
    fn value_roundtrip(value in arb_value()) {
        let bytes = encode(&value).unwrap();
        let (decoded, used) = decode(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(used, bytes.len());
    }

    #[test]
    fn truncated_value_never_decodes(value in arb_value()) {
        let bytes = encode(&value).unwrap();
        for len in 0..bytes.len() {
            prop_assert!(decode(&bytes[..len]).is_err());
        }
    }

    #[test]
    fn store_roundtrip(values in prop::collection::vec(arb_value(), 1..6)) {
        let store = Store::ephemeral();
        for (i, value) in values.iter().enumerate() {
            store.set_value(&format!("ns.k{}", i), value.clone()).unwrap();
        }
        let copy = Store::from_snapshot(&store.encode().unwrap()).unwrap();
        for (i, value) in values.iter().enumerate() {
            prop_assert_eq!(copy.get_value(&format!("ns.k{}", i)).unwrap(), Some(value.clone()));
        }
    }
}

#[test]
fn edge_values_roundtrip() {
    let deep = (0..configx::MAX_NESTING_DEPTH).fold(Value::Int(1), |v, _| Value::List(vec![v]));
    for value in [
        Value::List(vec![]),
        Value::List(vec![Value::List(vec![]), Value::List(vec![Value::List(vec![])])]),
        Value::List(vec![Value::Int(1), Value::from("two"), Value::Float(3.0), Value::Bool(false)]),
        Value::Float(f64::INFINITY),
        Value::Float(-0.0),
        Value::Int(i64::MIN),
        Value::from(""),
        Value::Json(serde_json::json!({"nested": {"k": [1, null]}})),
        deep,
    ] {
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap().0, value);
    }
}

#[test]
fn empty_tree_snapshot() {
    let bytes = encode_tree(&ConfigTree::new()).unwrap();
    assert_eq!(&bytes[..4], b"CFGX");
    assert!(decode_tree(&bytes).unwrap().is_empty());
}

#[test]
fn corrupt_snapshot_is_rejected() {
    let store = store_with_items();
    let mut bytes = store.encode().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    assert!(matches!(
        Store::from_snapshot(&bytes),
        Err(Error::CorruptSnapshot { .. })
    ));
}
