//! Expression language: AST and parser
//!
//! Callers submit single-string statements such as `items[0]=99` or
//! `scores!sum`; [`parse`] turns them into a [`PathExpression`].

pub mod ast;
pub mod parser;

pub use ast::{
    Accessor, AccessorChain, CompareOp, Filter, Operation, PathExpression, Query,
};
pub use parser::{parse, parse_literal};

impl std::str::FromStr for PathExpression {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
