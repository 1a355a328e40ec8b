//! Set, append, insert, remove and delete statements.

use crate::common::*;

#[test]
fn set_returns_assigned_value() {
    let store = Store::ephemeral();
    assert_eq!(run(&store, "items=[1,2,3,4]"), Some(ints(&[1, 2, 3, 4])));
    assert_eq!(run(&store, "items[0]=99"), Some(Value::Int(99)));
    assert_eq!(get(&store, "items"), ints(&[99, 2, 3, 4]));
}

#[test]
fn set_nested_index() {
    let store = Store::ephemeral();
    run(&store, "matrix=[[1,2],[3,4]]");
    run(&store, "matrix[0][1]=99");
    assert_eq!(get(&store, "matrix[0]"), ints(&[1, 99]));
}

#[test]
fn broadcast_sets() {
    let store = store_with_items();
    run(&store, "items[*]=0");
    assert_eq!(get(&store, "items"), ints(&[0, 0, 0, 0]));

    run(&store, "items=[1,2,3,4]");
    run(&store, "items[1..2]=7");
    assert_eq!(get(&store, "items"), ints(&[1, 7, 7, 4]));

    run(&store, "items[?<5]=0");
    assert_eq!(get(&store, "items"), ints(&[0, 7, 7, 0]));
}

#[test]
fn wildcard_set_keeps_length() {
    let store = Store::ephemeral();
    for n in [0usize, 1, 5] {
        let list: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        run(&store, &format!("l=[{}]", list.join(",")));
        run(&store, "l[*]=0");
        assert_eq!(get(&store, "l"), ints(&vec![0; n]));
    }
}

#[test]
fn projection_set() {
    let store = Store::ephemeral();
    run(&store, r#"users=[{"name":"ann"},{"name":"bob"}]"#);
    run(&store, "users[*].active=true");
    assert_eq!(
        get(&store, "users[*].active"),
        Value::List(vec![Value::Bool(true), Value::Bool(true)])
    );
}

#[test]
fn slice_assignment_is_rejected() {
    let store = store_with_items();
    assert!(matches!(
        fail(&store, "items[1:2]=0"),
        Error::InvalidSyntax { .. }
    ));
}

#[test]
fn append_and_extend() {
    let store = store_with_items();
    assert_eq!(run(&store, "items+=5"), Some(ints(&[1, 2, 3, 4, 5])));
    run(&store, "items+=[6,7]");
    assert_eq!(get(&store, "items"), ints(&[1, 2, 3, 4, 5, 6, 7]));
}

#[test]
fn append_wrapped_list_nests() {
    let store = Store::ephemeral();
    run(&store, "pairs=[]");
    run(&store, "pairs+=[[1,2]]");
    assert_eq!(get(&store, "pairs"), Value::List(vec![ints(&[1, 2])]));
}

#[test]
fn append_to_missing_path() {
    let store = Store::ephemeral();
    assert!(matches!(
        fail(&store, "nothing+=1"),
        Error::PathNotFound { .. }
    ));
    assert_eq!(run(&store, "nothing!"), None);
}

#[test]
fn insert_positions() {
    let store = store_with_items();
    run(&store, "items+0=0");
    assert_eq!(get(&store, "items"), ints(&[0, 1, 2, 3, 4]));
    run(&store, "items+5=5");
    assert_eq!(get(&store, "items"), ints(&[0, 1, 2, 3, 4, 5]));
    assert_eq!(
        fail(&store, "items+7=1"),
        Error::IndexOutOfBounds { index: 7, len: 6 }
    );
}

#[test]
fn remove_by_index_and_value() {
    let store = store_with_items();
    assert_eq!(run(&store, "items[0]-"), Some(ints(&[2, 3, 4])));

    run(&store, "items=[1,2,3,4]");
    assert_eq!(run(&store, "items[-]=2"), Some(ints(&[1, 3, 4])));
    assert!(matches!(
        fail(&store, "items[-]=42"),
        Error::ValueNotFound { .. }
    ));
}

#[test]
fn remove_by_value_is_type_aware() {
    let store = Store::ephemeral();
    run(&store, r#"mixed=["2",2]"#);
    run(&store, "mixed[-]=2");
    assert_eq!(get(&store, "mixed"), Value::List(vec![Value::from("2")]));
}

#[test]
fn clear_versus_delete() {
    let store = store_with_items();
    assert_eq!(run(&store, "items[*]-"), Some(ints(&[])));
    assert_eq!(get(&store, "items"), ints(&[]));

    assert_eq!(run(&store, "items-"), None);
    assert!(matches!(fail(&store, "items"), Error::PathNotFound { .. }));
}

#[test]
fn delete_range_and_filter() {
    let store = Store::ephemeral();
    run(&store, "l=[1,2,3,4,5,6]");
    run(&store, "l[0..1]-");
    assert_eq!(get(&store, "l"), ints(&[3, 4, 5, 6]));
    run(&store, "l[?>4]-");
    assert_eq!(get(&store, "l"), ints(&[3, 4]));
}

#[test]
fn delete_projected_field() {
    let store = Store::ephemeral();
    run(&store, r#"users=[{"name":"ann","tmp":1},{"name":"bob","tmp":2}]"#);
    run(&store, "users[*].tmp-");
    assert!(matches!(
        fail(&store, "users[*].tmp"),
        Error::PathNotFound { .. }
    ));
    assert_eq!(
        get(&store, "users[*].name"),
        Value::List(vec![Value::from("ann"), Value::from("bob")])
    );
}

#[test]
fn nested_list_mutations() {
    let store = Store::ephemeral();
    run(&store, "m=[[1],[2]]");
    run(&store, "m[0]+=5");
    run(&store, "m[1]+0=0");
    run(&store, "m[1][-]=2");
    assert_eq!(
        get(&store, "m"),
        Value::List(vec![ints(&[1, 5]), ints(&[0])])
    );
}
