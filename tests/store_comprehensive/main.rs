//! End-to-end statement, persistence and concurrency tests through the
//! public `configx` API.

#[path = "../common/mod.rs"]
mod common;

mod codec;
mod concurrency;
mod mutations;
mod namespaces;
mod persistence;
mod safe_mode;
