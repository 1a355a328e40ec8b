//! Statement interpreter
//!
//! Routes a parsed [`PathExpression`] to the accessor evaluator, the query
//! functions or the mutation engine, and applies safe-mode: a suppressible
//! lookup failure becomes an absent result, everything else propagates.

use crate::{accessor, mutation, query};
use configx_core::{Error, Operation, PathExpression, Result, Value, MAX_NESTING_DEPTH};
use configx_storage::{ConfigTree, Node};
use std::borrow::Cow;

/// Evaluate a read-only statement (get, safe-get, query).
///
/// Mutating statements are rejected with `InvalidSyntax`; use [`execute`].
pub fn evaluate(tree: &ConfigTree, expr: &PathExpression) -> Result<Option<Value>> {
    if !expr.is_read_only() {
        return Err(Error::syntax(
            0,
            format!("'{}' mutates the tree and needs exclusive access", expr),
        ));
    }
    suppress(expr.safe, read(tree, expr).map(Some))
}

/// Execute any statement.
///
/// Returns the statement result: the read value, the assigned value for a
/// set, a copy of the resulting list for list mutations, and absent for a
/// whole-path delete.
pub fn execute(tree: &mut ConfigTree, expr: &PathExpression) -> Result<Option<Value>> {
    execute_with_depth(tree, expr, MAX_NESTING_DEPTH)
}

/// [`execute`] with writes bounded to `max_depth` levels of list nesting.
pub fn execute_with_depth(
    tree: &mut ConfigTree,
    expr: &PathExpression,
    max_depth: usize,
) -> Result<Option<Value>> {
    let path = expr.path.as_slice();
    let chain = expr.accessors.as_slice();
    match &expr.operation {
        Operation::Get | Operation::SafeGet | Operation::Query(_) => evaluate(tree, expr),
        Operation::Set(value) => {
            mutation::set(tree, path, chain, value.clone(), max_depth).map(Some)
        }
        Operation::Append(value) => {
            mutation::append(tree, path, chain, value.clone(), max_depth).map(Some)
        }
        Operation::Insert { index, value } => {
            mutation::insert(tree, path, chain, *index, value.clone(), max_depth).map(Some)
        }
        Operation::RemoveByValue(value) => {
            mutation::remove_by_value(tree, path, chain, value).map(Some)
        }
        Operation::DeleteSelected => mutation::delete_selected(tree, path, chain).map(Some),
        Operation::DeleteWhole => mutation::delete_whole(tree, path).map(|()| None),
    }
}

fn read(tree: &ConfigTree, expr: &PathExpression) -> Result<Value> {
    let base = match tree.locate(&expr.path)? {
        Node::Leaf(value) => accessor::evaluate(value, &expr.accessors, expr.safe)?,
        Node::Namespace(_) if !expr.accessors.is_empty() => {
            return Err(Error::type_error(format!(
                "'{}' is a namespace; accessors apply to list values",
                expr.path_string()
            )))
        }
        namespace => Cow::Owned(namespace.to_value()),
    };
    match &expr.operation {
        Operation::Query(q) => query::run(q, &base),
        _ => Ok(base.into_owned()),
    }
}

fn suppress(safe: bool, result: Result<Option<Value>>) -> Result<Option<Value>> {
    match result {
        Err(e) if safe && e.is_suppressible() => Ok(None),
        other => other,
    }
}
