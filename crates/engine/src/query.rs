//! Read-only query functions over a resolved list

use configx_core::{Error, Query, Result, Value};
use std::cmp::Ordering;

/// Run `query` against `target`, which must be a list.
pub fn run(query: &Query, target: &Value) -> Result<Value> {
    let items = target.as_list().ok_or_else(|| {
        Error::type_error(format!(
            "query '{}' requires a List, found {}",
            query.name(),
            target.type_name()
        ))
    })?;

    match query {
        Query::Len => Ok(Value::Int(items.len() as i64)),
        Query::Contains(needle) => Ok(Value::Bool(items.contains(needle))),
        Query::Index(needle) => items
            .iter()
            .position(|item| item == needle)
            .map(|i| Value::Int(i as i64))
            .ok_or_else(|| Error::ValueNotFound {
                value: needle.to_string(),
            }),
        Query::Sum => sum(items),
        Query::Min => extreme(items, "min", Ordering::Less),
        Query::Max => extreme(items, "max", Ordering::Greater),
        Query::Reverse => Ok(Value::List(items.iter().rev().cloned().collect())),
    }
}

fn require_numeric(items: &[Value], function: &str) -> Result<()> {
    match items.iter().find(|item| !item.is_numeric()) {
        Some(item) => Err(Error::type_error(format!(
            "{} requires numeric elements, found {}",
            function,
            item.type_name()
        ))),
        None => Ok(()),
    }
}

/// Int unless a Float is present; an Int sum that overflows falls back to
/// Float.
fn sum(items: &[Value]) -> Result<Value> {
    require_numeric(items, "sum")?;
    let float_sum = || Value::Float(items.iter().filter_map(Value::as_f64).sum());

    if items.iter().any(|item| matches!(item, Value::Float(_))) {
        return Ok(float_sum());
    }
    let mut total: i64 = 0;
    for item in items {
        match item.as_int().and_then(|i| total.checked_add(i)) {
            Some(next) => total = next,
            None => return Ok(float_sum()),
        }
    }
    Ok(Value::Int(total))
}

fn extreme(items: &[Value], function: &str, wanted: Ordering) -> Result<Value> {
    require_numeric(items, function)?;
    if items.is_empty() {
        return Err(Error::EmptyAggregate {
            function: function.to_string(),
        });
    }

    if items.iter().all(|item| matches!(item, Value::Int(_))) {
        let ints = items.iter().filter_map(Value::as_int);
        let best = if wanted == Ordering::Less {
            ints.min()
        } else {
            ints.max()
        };
        return Ok(best.map_or(Value::Float(f64::NAN), Value::Int));
    }

    let mut best: Option<f64> = None;
    for x in items.iter().filter_map(Value::as_f64) {
        best = match best {
            Some(current) if current.total_cmp(&x) != wanted.reverse() => Some(current),
            _ => Some(x),
        };
    }
    Ok(Value::Float(best.unwrap_or(f64::NAN)))
}
