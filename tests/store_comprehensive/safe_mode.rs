//! Safe-mode converts lookups that miss into absent results and nothing
//! else.

use crate::common::*;

#[test]
fn out_of_bounds_is_absent() {
    let store = store_with_items();
    assert_eq!(run(&store, "items[100]!"), None);
    assert_eq!(run(&store, "items[1..9]!"), None);
    assert_eq!(run(&store, "items[0]!"), Some(Value::Int(1)));
}

#[test]
fn missing_path_is_absent() {
    let store = Store::ephemeral();
    assert_eq!(run(&store, "no.such.path!"), None);
    run(&store, "leaf=1");
    assert_eq!(run(&store, "leaf.below!"), None);
}

#[test]
fn type_errors_are_never_suppressed() {
    let store = Store::ephemeral();
    run(&store, "port=8080");
    run(&store, r#"mixed=[1,"a"]"#);
    assert!(matches!(fail(&store, "port[0]!"), Error::TypeError { .. }));
    assert!(matches!(fail(&store, "mixed[?>0]!"), Error::TypeError { .. }));
}

#[test]
fn safe_projection_omits_missing_fields() {
    let store = Store::ephemeral();
    run(&store, r#"users=[{"name":"ann"},{"id":2},{"name":"cy"}]"#);
    assert_eq!(
        get(&store, "users[*].name!"),
        Value::List(vec![Value::from("ann"), Value::from("cy")])
    );
}

#[test]
fn safe_with_delete_is_ambiguous() {
    let store = store_with_items();
    assert!(matches!(fail(&store, "items-!"), Error::InvalidSyntax { .. }));
    assert!(matches!(fail(&store, "items!-"), Error::InvalidSyntax { .. }));
    assert_eq!(get(&store, "items"), ints(&[1, 2, 3, 4]));
}
