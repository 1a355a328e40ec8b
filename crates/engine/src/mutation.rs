//! Mutation engine
//!
//! Every statement runs in two phases: first walk to the target and compute
//! the full selection (bounds, filters, field presence), then apply. The
//! apply phase cannot fail, so a failed statement leaves the tree untouched.
//!
//! Mutations other than whole-path set and delete address a list: the leaf
//! at the base path, walked through a prefix of index accessors.

use crate::accessor::{self, not_a_list, not_a_map, resolve_index};
use configx_core::{Accessor, Error, Result, Value};
use configx_storage::ConfigTree;

/// Split an optional trailing projection off a write chain
fn split_projection(chain: &[Accessor]) -> (&[Accessor], Option<&str>) {
    match chain.split_last() {
        Some((Accessor::FieldProjection(field), body)) => (body, Some(field.as_str())),
        _ => (chain, None),
    }
}

/// The list reached from the leaf at `path` through index-only `prefix`
fn list_at<'t>(
    tree: &'t mut ConfigTree,
    path: &[String],
    prefix: &[Accessor],
) -> Result<&'t mut Vec<Value>> {
    let mut current = tree.leaf_mut(path)?;
    for accessor in prefix {
        let Accessor::Index(index) = accessor else {
            return Err(Error::syntax(
                0,
                format!("'{}' cannot address a nested list for writing", accessor),
            ));
        };
        let items = match current {
            Value::List(items) => items,
            other => return Err(not_a_list(other)),
        };
        let idx = resolve_index(*index, items.len())?;
        current = &mut items[idx];
    }
    match current {
        Value::List(items) => Ok(items),
        other => Err(not_a_list(other)),
    }
}

/// Reject values that would nest lists deeper than `max_depth` once stored
/// `levels` lists deep. The snapshot loader applies the same bound.
fn check_depth(max_depth: usize, levels: usize, value: &Value) -> Result<()> {
    if levels + value.nesting_depth() > max_depth {
        return Err(Error::syntax(
            0,
            format!("list nesting would exceed {} levels", max_depth),
        ));
    }
    Ok(())
}

/// `path=value`, `path[i]=value`, `path[sel]=value`, `path[sel].field=value`.
///
/// Returns the assigned value.
pub fn set(
    tree: &mut ConfigTree,
    path: &[String],
    chain: &[Accessor],
    value: Value,
    max_depth: usize,
) -> Result<Value> {
    let (body, projection) = split_projection(chain);
    let Some((target, prefix)) = body.split_last() else {
        check_depth(max_depth, 0, &value)?;
        tree.set(path, value.clone())?;
        return Ok(value);
    };
    if matches!(target, Accessor::Slice { .. }) {
        return Err(Error::syntax(
            0,
            "slice assignment is not supported; slices are read-only",
        ));
    }

    let items = list_at(tree, path, prefix)?;
    let selected = accessor::select(items, target)?;

    match projection {
        None => {
            check_depth(max_depth, prefix.len() + 1, &value)?;
            for i in selected {
                items[i] = value.clone();
            }
        }
        Some(field) => {
            if let Some(&i) = selected.iter().find(|&&i| items[i].as_json_object().is_none()) {
                return Err(not_a_map(&items[i], field));
            }
            let json = value.to_json();
            for i in selected {
                if let Some(map) = items[i].as_json_object_mut() {
                    map.insert(field.to_string(), json.clone());
                }
            }
        }
    }
    Ok(value)
}

/// `path+=value`: a list operand extends, anything else is pushed.
pub fn append(
    tree: &mut ConfigTree,
    path: &[String],
    chain: &[Accessor],
    value: Value,
    max_depth: usize,
) -> Result<Value> {
    let items = list_at(tree, path, chain)?;
    match value {
        Value::List(extra) => {
            for item in &extra {
                check_depth(max_depth, chain.len() + 1, item)?;
            }
            items.extend(extra);
        }
        single => {
            check_depth(max_depth, chain.len() + 1, &single)?;
            items.push(single);
        }
    }
    Ok(Value::List(items.clone()))
}

/// `path+N=value`: insert before `N`, `0 <= N <= len`.
pub fn insert(
    tree: &mut ConfigTree,
    path: &[String],
    chain: &[Accessor],
    index: i64,
    value: Value,
    max_depth: usize,
) -> Result<Value> {
    let items = list_at(tree, path, chain)?;
    let len = items.len();
    let position = usize::try_from(index)
        .ok()
        .filter(|&p| p <= len)
        .ok_or(Error::IndexOutOfBounds { index, len })?;
    check_depth(max_depth, chain.len() + 1, &value)?;
    items.insert(position, value);
    Ok(Value::List(items.clone()))
}

/// `path[-]=value`: remove the first structurally equal element.
pub fn remove_by_value(
    tree: &mut ConfigTree,
    path: &[String],
    chain: &[Accessor],
    value: &Value,
) -> Result<Value> {
    let items = list_at(tree, path, chain)?;
    let position = items
        .iter()
        .position(|item| item == value)
        .ok_or_else(|| Error::ValueNotFound {
            value: value.to_string(),
        })?;
    items.remove(position);
    Ok(Value::List(items.clone()))
}

/// `path[...]-`: remove the selected elements, or with a trailing
/// projection remove the field from every selected map.
pub fn delete_selected(
    tree: &mut ConfigTree,
    path: &[String],
    chain: &[Accessor],
) -> Result<Value> {
    let (body, projection) = split_projection(chain);
    let Some((target, prefix)) = body.split_last() else {
        return Err(Error::syntax(0, "delete-selected requires an accessor"));
    };
    if matches!(target, Accessor::Slice { .. }) {
        return Err(Error::syntax(0, "slices are read-only and cannot be deleted"));
    }

    let items = list_at(tree, path, prefix)?;
    let selected = accessor::select(items, target)?;

    match projection {
        None => {
            let mut doomed = vec![false; items.len()];
            for i in selected {
                doomed[i] = true;
            }
            let mut position = 0;
            items.retain(|_| {
                let keep = !doomed[position];
                position += 1;
                keep
            });
        }
        Some(field) => {
            for &i in &selected {
                let map = items[i]
                    .as_json_object()
                    .ok_or_else(|| not_a_map(&items[i], field))?;
                if !map.contains_key(field) {
                    return Err(Error::path_not_found(format!("[{}].{}", i, field)));
                }
            }
            for i in selected {
                if let Some(map) = items[i].as_json_object_mut() {
                    map.remove(field);
                }
            }
        }
    }
    Ok(Value::List(items.clone()))
}

/// `path-`: remove a leaf or a whole namespace subtree.
pub fn delete_whole(tree: &mut ConfigTree, path: &[String]) -> Result<()> {
    tree.remove(path).map(|_| ())
}
