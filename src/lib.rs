//! ConfigX - embedded, path-addressable configuration store
//!
//! Callers submit single-string expressions that are parsed, resolved
//! against a hierarchical typed value tree and executed atomically. The
//! tree persists to a checksummed binary snapshot.
//!
//! # Quick Start
//!
//! ```
//! use configx::{Store, Value};
//!
//! let store = Store::ephemeral();
//! store.resolve("scores=[95,87,92,88]").unwrap();
//!
//! assert_eq!(
//!     store.resolve("scores[?>90]").unwrap(),
//!     Some(Value::List(vec![Value::Int(95), Value::Int(92)]))
//! );
//! assert_eq!(store.resolve("scores!max").unwrap(), Some(Value::Int(95)));
//! ```
//!
//! # Expression Syntax
//!
//! | Form | Effect |
//! |------|--------|
//! | `a.b` | Get |
//! | `a.b!` | Safe get (absent instead of not-found / out-of-bounds) |
//! | `a.b=v` | Set |
//! | `a.b+=v` | Append, or extend with a list literal |
//! | `a.b+N=v` | Insert before `N` |
//! | `a.b[-]=v` | Remove first element equal to `v` |
//! | `a.b[...]-` | Delete selected elements |
//! | `a.b-` | Delete the path |
//! | `a.b!len` | Query (`len`, `contains=v`, `index=v`, `sum`, `min`, `max`, `reverse`) |
//!
//! # Architecture
//!
//! - `configx-core`: values, errors, expression parser
//! - `configx-storage`: namespace tree, value codec, snapshots
//! - `configx-engine`: accessor evaluation, mutations, queries, `Store`

pub use configx_core::{
    parse, parse_literal, Accessor, CompareOp, Error, Filter, Operation, PathExpression, Query,
    Result, Value, MAX_EXPRESSION_LENGTH, MAX_NESTING_DEPTH,
};
pub use configx_engine::{
    DurabilityMode, Store, StoreConfig, CONFIG_FILE_NAME, DEFAULT_SNAPSHOT_FILE,
};
pub use configx_storage::{decode, decode_tree, encode, encode_tree, ConfigTree, Node};
