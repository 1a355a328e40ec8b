//! Concurrent statements never observe a partial mutation.

use crate::common::*;
use std::sync::Arc;
use std::thread;

#[test]
fn appends_from_many_threads_all_land() {
    let store = Arc::new(Store::ephemeral());
    run(&store, "items=[]");

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..50 {
                    store.resolve(&format!("items+={}", t * 100 + i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(get(&store, "items!len"), Value::Int(400));
    let expected: i64 = (0..8).flat_map(|t| (0..50).map(move |i| t * 100 + i)).sum();
    assert_eq!(get(&store, "items!sum"), Value::Int(expected));
}

#[test]
fn readers_see_whole_lists() {
    let store = Arc::new(Store::ephemeral());
    run(&store, "pair=[0,0]");

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 1..=200 {
                store.resolve(&format!("pair[*]={}", i)).unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    match get(&store, "pair") {
                        Value::List(items) => assert_eq!(items[0], items[1]),
                        other => panic!("pair became {:?}", other),
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(get(&store, "pair"), ints(&[200, 200]));
}

#[test]
fn snapshots_taken_mid_flight_decode() {
    let store = Arc::new(Store::ephemeral());
    run(&store, "items=[]");

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..100 {
                store.resolve(&format!("items+={}", i)).unwrap();
            }
        })
    };
    for _ in 0..20 {
        let copy = Store::from_snapshot(&store.encode().unwrap()).unwrap();
        let Value::List(items) = get(&copy, "items") else {
            panic!("items is not a list");
        };
        assert_eq!(items, (0..items.len() as i64).map(Value::Int).collect::<Vec<_>>());
    }
    writer.join().unwrap();
}
