//! Namespace/leaf exclusivity and namespace-level reads and deletes.

use crate::common::*;
use serde_json::json;

#[test]
fn auto_vivify_and_read_namespace() {
    let store = Store::ephemeral();
    run(&store, r#"app.ui.theme="dark""#);
    run(&store, "app.ui.scale=2");
    assert_eq!(get(&store, "app.ui.theme"), Value::from("dark"));
    assert_eq!(
        get(&store, "app"),
        Value::Json(json!({"ui": {"scale": 2, "theme": "dark"}}))
    );
}

#[test]
fn write_beneath_leaf_is_type_error() {
    let store = Store::ephemeral();
    run(&store, "a.b=1");
    assert!(matches!(fail(&store, "a.b.c=2"), Error::TypeError { .. }));
    assert_eq!(get(&store, "a.b"), Value::Int(1));
}

#[test]
fn overwrite_namespace_with_leaf_is_type_error() {
    let store = Store::ephemeral();
    run(&store, "a.b.c=1");
    assert!(matches!(fail(&store, "a.b=2"), Error::TypeError { .. }));
    assert_eq!(get(&store, "a.b.c"), Value::Int(1));
}

#[test]
fn delete_keeps_ancestors() {
    let store = Store::ephemeral();
    run(&store, "a.b.c=1");
    run(&store, "a.b.c-");
    assert_eq!(get(&store, "a.b"), Value::Json(json!({})));
}

#[test]
fn delete_namespace_subtree() {
    let store = Store::ephemeral();
    run(&store, "a.b.c=1");
    run(&store, "a.b.d=2");
    run(&store, "a.b-");
    assert!(matches!(fail(&store, "a.b.c"), Error::PathNotFound { .. }));
    assert_eq!(get(&store, "a"), Value::Json(json!({})));
}

#[test]
fn accessor_on_namespace_is_type_error() {
    let store = Store::ephemeral();
    run(&store, "a.b=1");
    assert!(matches!(fail(&store, "a[0]"), Error::TypeError { .. }));
}

#[test]
fn typed_convenience_calls() {
    let store = Store::ephemeral();
    store.set_value("server.port", 8080).unwrap();
    store.set_value("server.hosts", vec!["a", "b"]).unwrap();
    assert_eq!(store.get_value("server.port").unwrap(), Some(Value::Int(8080)));
    assert_eq!(
        store.get_value("server.hosts[1]").unwrap(),
        Some(Value::from("b"))
    );
    assert_eq!(store.paths(), vec!["server.hosts", "server.port"]);
}
