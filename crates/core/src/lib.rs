//! Core types for ConfigX
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: closed tagged union stored at every leaf
//! - Error: error taxonomy shared by parser, engine and snapshot codec
//! - Expression AST and parser: `PathExpression`, `Accessor`, `Operation`
//! - Limits: nesting depth and expression size bounds

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod expr;
pub mod limits;
pub mod value;

pub use error::{Error, Result};
pub use expr::{
    parse, parse_literal, Accessor, AccessorChain, CompareOp, Filter, Operation, PathExpression,
    Query,
};
pub use limits::{MAX_EXPRESSION_LENGTH, MAX_NESTING_DEPTH, MAX_PATH_LENGTH};
pub use value::Value;
