//! Error types for ConfigX
//!
//! Every failure surfaced by `resolve()`, the snapshot codec or the store is
//! one of the variants of [`Error`]. We use `thiserror` for the `Display` and
//! `Error` implementations.
//!
//! # Categories
//!
//! | Category | Variants | Description |
//! |----------|----------|-------------|
//! | Lookup | `PathNotFound`, `IndexOutOfBounds` | Addressed entity doesn't exist |
//! | Type | `TypeError` | Operation applied to the wrong kind of value |
//! | Syntax | `InvalidSyntax` | Malformed expression or unsupported form |
//! | Data | `ValueNotFound`, `EmptyAggregate` | Operation has nothing to act on |
//! | Persistence | `CorruptSnapshot`, `Io`, `Config` | Snapshot and file layer |
//!
//! Only the lookup category can be suppressed, and only by safe-mode.

use serde::{Deserialize, Serialize};
use std::io;

/// Result type alias for ConfigX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing, evaluating or persisting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Lookup ====================
    /// Addressed path, namespace or map field is absent
    #[error("path not found: {path}")]
    PathNotFound {
        /// The path (or field) that was not found
        path: String,
    },

    /// Index, insert position or range bound outside the valid range
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds {
        /// The requested index, as written
        index: i64,
        /// Length of the list at the time of the check
        len: usize,
    },

    // ==================== Type ====================
    /// Indexing a non-list, incompatible comparison, namespace/leaf conflict
    #[error("type error: {reason}")]
    TypeError {
        /// What was wrong
        reason: String,
    },

    // ==================== Syntax ====================
    /// Malformed expression or literal, or an unsupported statement form
    #[error("invalid syntax at position {position}: {reason}")]
    InvalidSyntax {
        /// Byte offset in the expression
        position: usize,
        /// What was expected
        reason: String,
    },

    // ==================== Data ====================
    /// Remove-by-value or `index` query found no matching element
    #[error("value not found: {value}")]
    ValueNotFound {
        /// Rendered form of the searched value
        value: String,
    },

    /// `min`/`max` over an empty list
    #[error("empty aggregate: {function} requires at least one element")]
    EmptyAggregate {
        /// Name of the aggregate function
        function: String,
    },

    // ==================== Persistence ====================
    /// Truncated or tag-inconsistent snapshot stream
    #[error("corrupt snapshot: {reason}")]
    CorruptSnapshot {
        /// What failed to decode
        reason: String,
    },

    /// I/O error in the store's file layer
    #[error("I/O error: {reason}")]
    Io {
        /// Underlying error message
        reason: String,
    },

    /// Invalid or unreadable configuration file
    #[error("configuration error: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },
}

impl Error {
    /// Create a `PathNotFound` error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Error::PathNotFound { path: path.into() }
    }

    /// Create a `TypeError` error
    pub fn type_error(reason: impl Into<String>) -> Self {
        Error::TypeError {
            reason: reason.into(),
        }
    }

    /// Create an `InvalidSyntax` error
    pub fn syntax(position: usize, reason: impl Into<String>) -> Self {
        Error::InvalidSyntax {
            position,
            reason: reason.into(),
        }
    }

    /// Create a `CorruptSnapshot` error
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Error::CorruptSnapshot {
            reason: reason.into(),
        }
    }

    /// Whether safe-mode may turn this error into an absent result.
    ///
    /// Only not-found and out-of-bounds lookups qualify.
    pub fn is_suppressible(&self) -> bool {
        matches!(
            self,
            Error::PathNotFound { .. } | Error::IndexOutOfBounds { .. }
        )
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io {
            reason: e.to_string(),
        }
    }
}
