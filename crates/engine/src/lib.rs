//! Execution engine for ConfigX
//!
//! This crate turns parsed statements into effects on a `ConfigTree`:
//! - Accessor evaluation: index, slice, wildcard, range, filter, projection
//! - Mutation engine: set, append, insert, remove, delete (atomic)
//! - Query functions: len, contains, index, sum, min, max, reverse
//! - Store: locking, configuration, snapshot persistence
//!
//! # Example
//!
//! ```
//! use configx_engine::Store;
//! use configx_core::Value;
//!
//! let store = Store::ephemeral();
//! store.resolve("items=[1,2,3,4]").unwrap();
//! assert_eq!(store.resolve("items[-1]").unwrap(), Some(Value::Int(4)));
//! assert_eq!(store.resolve("items[100]!").unwrap(), None);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod config;
pub mod interpreter;
pub mod mutation;
pub mod query;
pub mod store;

pub use config::{DurabilityMode, StoreConfig, CONFIG_FILE_NAME, DEFAULT_SNAPSHOT_FILE};
pub use interpreter::{evaluate, execute, execute_with_depth};
pub use store::Store;
