//! Snapshot persistence across close, reopen and crash.

use crate::common::*;
use configx::{CONFIG_FILE_NAME, DurabilityMode};

#[test]
fn close_and_reopen_restores_everything() {
    let mut ts = TestStore::new();
    run(ts.store(), r#"users=[{"name":"ann","age":31},{"name":"bob"}]"#);
    run(ts.store(), "items=[1,[2,3],\"four\",5.5,true]");
    run(ts.store(), "app.ui.theme=\"dark\"");
    let items = get(ts.store(), "items");
    let users = get(ts.store(), "users");

    ts.reopen();
    assert_eq!(get(ts.store(), "items"), items);
    assert_eq!(get(ts.store(), "users"), users);
    assert_eq!(get(ts.store(), "app.ui.theme"), Value::from("dark"));
    assert_eq!(get(ts.store(), "items[1][-1]"), Value::Int(3));
}

#[test]
fn fresh_directory_gets_default_config() {
    let ts = TestStore::new();
    let config_path = ts.dir.path().join(CONFIG_FILE_NAME);
    assert!(config_path.exists());
    assert_eq!(ts.store().config().durability_mode().unwrap(), DurabilityMode::OnClose);
    assert!(ts.store().is_persistent());
    assert_eq!(ts.store().data_dir(), Some(ts.dir.path()));
}

#[test]
fn empty_store_reopens_empty() {
    let mut ts = TestStore::new();
    ts.reopen();
    assert!(ts.store().paths().is_empty());
    assert!(matches!(fail(ts.store(), "anything"), Error::PathNotFound { .. }));
}

#[test]
fn on_close_writes_nothing_until_save() {
    let ts = TestStore::new();
    run(ts.store(), "items=[1]");
    assert!(!ts.snapshot_path().exists());
    ts.store().save().unwrap();
    assert!(ts.snapshot_path().exists());
}

#[test]
fn drop_saves_pending_changes() {
    let mut ts = TestStore::new();
    run(ts.store(), "items=[1,2]");
    ts.crash();
    ts.store = Some(Store::open(ts.dir.path()).unwrap());
    assert_eq!(get(ts.store(), "items"), ints(&[1, 2]));
}

#[test]
fn always_durability_persists_each_mutation() {
    let ts = TestStore::with_config(always_config());
    run(ts.store(), "items=[1,2,3]");
    assert!(ts.snapshot_path().exists());

    // A second handle on the same directory sees the written snapshot.
    let other = Store::open(ts.dir.path()).unwrap();
    assert_eq!(get(&other, "items"), ints(&[1, 2, 3]));
    assert_eq!(other.config().durability_mode().unwrap(), DurabilityMode::Always);
    drop(other);

    run(ts.store(), "items+=4");
    let other = Store::open(ts.dir.path()).unwrap();
    assert_eq!(get(&other, "items"), ints(&[1, 2, 3, 4]));
}

#[test]
fn failed_mutation_is_not_persisted() {
    let mut ts = TestStore::with_config(always_config());
    run(ts.store(), "items=[1,2]");
    let before = std::fs::read(ts.snapshot_path()).unwrap();
    fail(ts.store(), "items[9]=0");
    assert_eq!(std::fs::read(ts.snapshot_path()).unwrap(), before);
    ts.reopen();
    assert_eq!(get(ts.store(), "items"), ints(&[1, 2]));
}

#[test]
fn corrupt_snapshot_fails_open() {
    let mut ts = TestStore::new();
    run(ts.store(), "items=[1,2,3,4]");
    ts.reopen();
    ts.crash();

    let path = ts.snapshot_path();
    let mut bytes = std::fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        Store::open(ts.dir.path()),
        Err(Error::CorruptSnapshot { .. })
    ));
}

#[test]
fn truncated_snapshot_fails_open() {
    let mut ts = TestStore::new();
    run(ts.store(), "items=[1,2,3,4]");
    ts.reopen();
    ts.crash();

    let path = ts.snapshot_path();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    assert!(matches!(
        Store::open(ts.dir.path()),
        Err(Error::CorruptSnapshot { .. })
    ));
}

#[test]
fn leftover_temp_file_is_removed() {
    let mut ts = TestStore::new();
    run(ts.store(), "items=[1]");
    ts.reopen();
    ts.crash();

    let temp = ts.dir.path().join(format!(".{}.tmp", DEFAULT_SNAPSHOT_FILE));
    std::fs::write(&temp, b"half-written").unwrap();
    ts.store = Some(Store::open(ts.dir.path()).unwrap());
    assert!(!temp.exists());
    assert_eq!(get(ts.store(), "items"), ints(&[1]));
}

#[test]
fn custom_snapshot_file_name() {
    let mut ts = TestStore::with_config(StoreConfig {
        snapshot_file: "settings.bin".to_string(),
        ..StoreConfig::default()
    });
    run(ts.store(), "a=1");
    ts.reopen();
    assert!(ts.dir.path().join("settings.bin").exists());
    assert!(!ts.snapshot_path().exists());
    assert_eq!(get(ts.store(), "a"), Value::Int(1));
}

#[test]
fn invalid_config_file_fails_open() {
    let ts = TestStore::new();
    let dir = ts.dir.path().to_path_buf();
    std::fs::write(dir.join(CONFIG_FILE_NAME), "durability = \"sometimes\"\n").unwrap();
    assert!(matches!(Store::open(&dir), Err(Error::Config { .. })));
}

#[test]
fn ephemeral_roundtrip_through_bytes() {
    let store = store_with_items();
    run(&store, "nested.list=[[1],[2,[3]]]");
    let bytes = store.encode().unwrap();
    let copy = Store::from_snapshot(&bytes).unwrap();
    assert_eq!(get(&copy, "items"), get(&store, "items"));
    assert_eq!(get(&copy, "nested.list"), get(&store, "nested.list"));
    assert_eq!(copy.encode().unwrap(), bytes);
    assert!(!copy.is_persistent());
}

#[test]
fn lowered_depth_limit_still_reopens() {
    let mut ts = TestStore::with_config(StoreConfig {
        max_nesting_depth: 2,
        ..StoreConfig::default()
    });
    assert!(matches!(fail(ts.store(), "a=[[[1]]]"), Error::InvalidSyntax { .. }));
    run(ts.store(), "m=[[1],[2]]");
    assert!(matches!(fail(ts.store(), "m[0]+=[[3]]"), Error::InvalidSyntax { .. }));
    assert!(matches!(fail(ts.store(), "m+0=[[0]]"), Error::InvalidSyntax { .. }));

    ts.reopen();
    assert_eq!(run(ts.store(), "a!"), None);
    assert_eq!(get(ts.store(), "m"), Value::List(vec![ints(&[1]), ints(&[2])]));
}

#[test]
fn failed_always_save_changes_nothing() {
    let mut ts = TestStore::with_config(always_config());
    run(ts.store(), "items=[1,2]");

    let blocker = ts.dir.path().join(format!(".{}.tmp", DEFAULT_SNAPSHOT_FILE));
    std::fs::create_dir(&blocker).unwrap();
    assert!(matches!(fail(ts.store(), "items+=3"), Error::Io { .. }));
    assert!(matches!(fail(ts.store(), "fresh=1"), Error::Io { .. }));
    assert_eq!(get(ts.store(), "items"), ints(&[1, 2]));
    assert_eq!(run(ts.store(), "fresh!"), None);

    std::fs::remove_dir(&blocker).unwrap();
    ts.reopen();
    assert_eq!(get(ts.store(), "items"), ints(&[1, 2]));
}
