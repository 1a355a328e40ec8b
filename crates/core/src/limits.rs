//! Hard limits enforced by the parser and the snapshot codec
//!
//! | Limit | Value | Constant |
//! |-------|-------|----------|
//! | Max list nesting depth | 100 levels | [`MAX_NESTING_DEPTH`] |
//! | Max expression length | 64 KiB | [`MAX_EXPRESSION_LENGTH`] |
//! | Max base path length | 256 segments | [`MAX_PATH_LENGTH`] |
//!
//! Nesting depth bounds recursion, so a hostile literal or snapshot cannot
//! overflow the stack.

/// Maximum nesting depth of list literals and decoded lists (100 levels)
pub const MAX_NESTING_DEPTH: usize = 100;

/// Maximum expression length in bytes (64 KiB)
pub const MAX_EXPRESSION_LENGTH: usize = 64 * 1024;

/// Maximum number of dotted segments in a base path
pub const MAX_PATH_LENGTH: usize = 256;
