//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use configx::{Error, Store, StoreConfig, Value, DEFAULT_SNAPSHOT_FILE};
use std::sync::Once;
use tempfile::TempDir;

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Create a StoreConfig with always durability mode.
pub fn always_config() -> StoreConfig {
    StoreConfig {
        durability: "always".to_string(),
        ..StoreConfig::default()
    }
}

// ============================================================================
// TestStore - persistent store in a temp directory
// ============================================================================

/// A persistent store that owns its temp directory.
pub struct TestStore {
    pub store: Option<Store>,
    pub dir: TempDir,
}

impl TestStore {
    /// Open a fresh store with the default config.
    pub fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().expect("tempdir");
        let store = Store::open(dir.path()).expect("open store");
        TestStore {
            store: Some(store),
            dir,
        }
    }

    /// Open a fresh store with an explicit config.
    pub fn with_config(config: StoreConfig) -> Self {
        init_tracing();
        let dir = TempDir::new().expect("tempdir");
        let store = Store::open_with(dir.path(), config).expect("open store");
        TestStore {
            store: Some(store),
            dir,
        }
    }

    /// The open store.
    pub fn store(&self) -> &Store {
        self.store.as_ref().expect("store is open")
    }

    /// Close the store and open the same directory again.
    pub fn reopen(&mut self) {
        if let Some(store) = self.store.take() {
            store.close().expect("close store");
        }
        self.store = Some(Store::open(self.dir.path()).expect("reopen store"));
    }

    /// Drop the store without calling close.
    pub fn crash(&mut self) {
        self.store.take();
    }

    /// Path of the default snapshot file.
    pub fn snapshot_path(&self) -> std::path::PathBuf {
        self.dir.path().join(DEFAULT_SNAPSHOT_FILE)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve an expression that must succeed and produce a value.
pub fn get(store: &Store, expr: &str) -> Value {
    store
        .resolve(expr)
        .unwrap_or_else(|e| panic!("'{}' failed: {}", expr, e))
        .unwrap_or_else(|| panic!("'{}' was absent", expr))
}

/// Resolve an expression that must succeed.
pub fn run(store: &Store, expr: &str) -> Option<Value> {
    store
        .resolve(expr)
        .unwrap_or_else(|e| panic!("'{}' failed: {}", expr, e))
}

/// Resolve an expression that must fail.
pub fn fail(store: &Store, expr: &str) -> Error {
    match store.resolve(expr) {
        Ok(v) => panic!("'{}' unexpectedly succeeded with {:?}", expr, v),
        Err(e) => e,
    }
}

/// A list of Ints.
pub fn ints(items: &[i64]) -> Value {
    Value::List(items.iter().map(|&i| Value::Int(i)).collect())
}

/// A store preloaded with `items=[1,2,3,4]`.
pub fn store_with_items() -> Store {
    let store = Store::ephemeral();
    run(&store, "items=[1,2,3,4]");
    store
}
