//! Storage layer for ConfigX
//!
//! This crate holds the configuration tree and its persistent form:
//! - ConfigTree: namespace trie with leaf/namespace exclusivity
//! - Value codec: tagged big-endian encoding of a single value
//! - Snapshot: framed, checksummed encoding of the whole tree plus
//!   crash-safe file writes
//!
//! Concurrency control lives in the engine; everything here is plain
//! single-owner data.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod snapshot;
pub mod tree;

pub use codec::{decode, encode, ValueReader};
pub use snapshot::{
    decode_tree, encode_tree, SnapshotFile, SNAPSHOT_FORMAT_VERSION, SNAPSHOT_MAGIC,
};
pub use tree::{Children, ConfigTree, Node};
