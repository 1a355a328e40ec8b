//! Accessor evaluation
//!
//! Accessors only apply to `List` values. Reads walk the chain left to
//! right over a [`Cow`], borrowing from the tree for plain indexing and
//! materialising a new list for every selection, so a read result never
//! aliases the stored list.
//!
//! Writes use [`select`] to turn the final accessor into element positions
//! up front; every bound and comparison is checked before anything moves.

use configx_core::{Accessor, CompareOp, Error, Filter, Result, Value};
use std::borrow::Cow;

/// Resolve a possibly negative index against `len`, strictly.
pub fn resolve_index(index: i64, len: usize) -> Result<usize> {
    let n = len as i64;
    let resolved = if index < 0 { index + n } else { index };
    if (0..n).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(Error::IndexOutOfBounds { index, len })
    }
}

/// Positions selected by a slice. Bounds clamp silently; a zero step is
/// rejected.
pub fn slice_indices(
    len: usize,
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
) -> Result<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(Error::syntax(0, "slice step cannot be zero"));
    }
    let n = len as i64;
    let mut out = Vec::new();

    if step > 0 {
        let clamp = |bound: i64| {
            if bound < 0 {
                (bound + n).max(0)
            } else {
                bound.min(n)
            }
        };
        let mut i = start.map_or(0, clamp);
        let stop = end.map_or(n, clamp);
        while i < stop {
            out.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else {
        // -1 stands for "before the first element"
        let clamp = |bound: i64| {
            if bound < 0 {
                (bound + n).max(-1)
            } else {
                bound.min(n - 1)
            }
        };
        let mut i = start.map_or(n - 1, clamp);
        let stop = end.map_or(-1, clamp);
        while i > stop {
            out.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    Ok(out)
}

/// Positions covered by an inclusive range. Both bounds must be in range;
/// `lo > hi` selects nothing.
pub fn range_indices(lo: i64, hi: i64, len: usize) -> Result<Vec<usize>> {
    let lo = resolve_index(lo, len)?;
    let hi = resolve_index(hi, len)?;
    Ok((lo..=hi).collect())
}

/// Positions of the elements matching `filter`, in order.
///
/// An ordering comparison against a non-numeric operand aborts the whole
/// evaluation with `TypeError`.
pub fn filter_indices(items: &[Value], filter: &Filter) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    for (i, element) in items.iter().enumerate() {
        if filter_matches(element, filter)? {
            out.push(i);
        }
    }
    Ok(out)
}

fn filter_matches(element: &Value, filter: &Filter) -> Result<bool> {
    let subject = match &filter.field {
        None => Some(Cow::Borrowed(element)),
        Some(field) => element
            .as_json_object()
            .and_then(|map| map.get(field))
            .map(|json| Cow::Owned(Value::from_json(json.clone()))),
    };
    match subject {
        Some(subject) => compare(&subject, filter.op, &filter.literal),
        None => match filter.op {
            CompareOp::Eq => Ok(false),
            CompareOp::Ne => Ok(true),
            op => Err(Error::type_error(format!(
                "cannot compare missing field '{}' with '{}'",
                filter.field.as_deref().unwrap_or_default(),
                op
            ))),
        },
    }
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> Result<bool> {
    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::Ne => Ok(left != right),
        _ => {
            if !left.is_numeric() || !right.is_numeric() {
                return Err(Error::type_error(format!(
                    "cannot order {} {} {}",
                    left.type_name(),
                    op,
                    right.type_name()
                )));
            }
            // NaN is unordered against everything
            Ok(match left.numeric_cmp(right) {
                Some(ord) => match op {
                    CompareOp::Gt => ord.is_gt(),
                    CompareOp::Lt => ord.is_lt(),
                    CompareOp::Ge => ord.is_ge(),
                    _ => ord.is_le(),
                },
                None => false,
            })
        }
    }
}

/// Element positions addressed by a single accessor.
///
/// An index yields exactly one position; wildcard, range, filter and slice
/// yield any number. A projection selects no positions and is rejected.
pub fn select(items: &[Value], accessor: &Accessor) -> Result<Vec<usize>> {
    match accessor {
        Accessor::Index(i) => resolve_index(*i, items.len()).map(|idx| vec![idx]),
        Accessor::Slice { start, end, step } => slice_indices(items.len(), *start, *end, *step),
        Accessor::Wildcard => Ok((0..items.len()).collect()),
        Accessor::Range { lo, hi } => range_indices(*lo, *hi, items.len()),
        Accessor::Filter(filter) => filter_indices(items, filter),
        Accessor::FieldProjection(name) => Err(Error::syntax(
            0,
            format!("projection '.{}' does not select list elements", name),
        )),
    }
}

/// Extract `field` from every element. Each element must be a map-like
/// `Json`; a missing field is `PathNotFound` unless `safe`, which omits it.
pub fn project(items: &[Value], field: &str, safe: bool) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(items.len());
    for (position, element) in items.iter().enumerate() {
        let map = element.as_json_object().ok_or_else(|| not_a_map(element, field))?;
        match map.get(field) {
            Some(json) => out.push(Value::from_json(json.clone())),
            None if safe => {}
            None => return Err(Error::path_not_found(format!("[{}].{}", position, field))),
        }
    }
    Ok(out)
}

pub(crate) fn not_a_list(value: &Value) -> Error {
    Error::type_error(format!("cannot apply an accessor to {}", value.type_name()))
}

pub(crate) fn not_a_map(value: &Value, field: &str) -> Error {
    Error::type_error(format!(
        "field '{}' requires a map-like Json element, found {}",
        field,
        value.type_name()
    ))
}

fn as_list(value: &Value) -> Result<&[Value]> {
    value.as_list().ok_or_else(|| not_a_list(value))
}

/// Evaluate a read chain against `value`.
///
/// The result borrows from `value` when the chain only indexes, and is a
/// fresh value otherwise.
pub fn evaluate<'a>(value: &'a Value, chain: &[Accessor], safe: bool) -> Result<Cow<'a, Value>> {
    let mut current = Cow::Borrowed(value);
    for accessor in chain {
        current = step(current, accessor, safe)?;
    }
    Ok(current)
}

fn step<'a>(current: Cow<'a, Value>, accessor: &Accessor, safe: bool) -> Result<Cow<'a, Value>> {
    let items = as_list(&current)?;
    match accessor {
        Accessor::Index(i) => {
            let idx = resolve_index(*i, items.len())?;
            match current {
                Cow::Borrowed(value) => Ok(Cow::Borrowed(&as_list(value)?[idx])),
                Cow::Owned(Value::List(mut owned)) => Ok(Cow::Owned(owned.swap_remove(idx))),
                Cow::Owned(other) => Err(not_a_list(&other)),
            }
        }
        Accessor::FieldProjection(field) => {
            Ok(Cow::Owned(Value::List(project(items, field, safe)?)))
        }
        selection => {
            let selected = select(items, selection)?
                .into_iter()
                .map(|i| items[i].clone())
                .collect();
            Ok(Cow::Owned(Value::List(selected)))
        }
    }
}
