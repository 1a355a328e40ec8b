//! Value types for ConfigX
//!
//! This module defines [`Value`], the closed tagged union stored at every
//! leaf of the configuration tree:
//! - Int, Float, Bool, Str: scalars
//! - List: ordered, possibly heterogeneous, arbitrarily nested
//! - Json: opaque nested map (or other JSON) not otherwise representable
//!
//! ### Type Rules
//!
//! - The variant is the type; no separate type tag is ever stored.
//! - No implicit coercions in equality: `Int(1) != Float(1.0)` and
//!   `Str("1") != Int(1)`.
//! - Float equality follows IEEE-754: `NaN != NaN`, `-0.0 == 0.0`.
//! - Ordering is only defined between numeric values (see
//!   [`Value::numeric_cmp`]).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// UTF-8 string
    Str(String),
    /// Ordered sequence of values
    List(Vec<Value>),
    /// Opaque JSON (objects, and JSON nulls nested inside them)
    Json(serde_json::Value),
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Bool(_) => "Bool",
            Value::Str(_) => "Str",
            Value::List(_) => "List",
            Value::Json(_) => "Json",
        }
    }

    /// Check if this is an Int or a Float
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Check if this is a list value
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is an Int or a Float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as &str if this is a Str value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a slice if this is a List value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as a mutable vector if this is a List value
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the JSON object map if this is a map-like Json value
    pub fn as_json_object(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            Value::Json(serde_json::Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Mutable access to the JSON object map of a map-like Json value
    pub fn as_json_object_mut(
        &mut self,
    ) -> Option<&mut serde_json::Map<String, serde_json::Value>> {
        match self {
            Value::Json(serde_json::Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Compare two numeric values.
    ///
    /// Int/Int compares exactly; any pairing with a Float compares as f64
    /// using IEEE-754 partial ordering (so NaN compares as `None`).
    /// Returns `None` when either side is not numeric.
    pub fn numeric_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    /// Convert a JSON value into the closest native variant.
    ///
    /// Scalars and arrays map onto Int/Float/Bool/Str/List; objects, null
    /// and numbers that fit neither i64 nor f64 stay opaque as `Json`.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(f)) => Value::Float(f),
                // Numbers with no f64 form stay opaque
                (None, None) => Value::Json(serde_json::Value::Number(n)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            other @ (serde_json::Value::Null | serde_json::Value::Object(_)) => Value::Json(other),
        }
    }

    /// Convert into JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Json(json) => json.clone(),
        }
    }

    /// Maximum list nesting depth (0 for anything that is not a list)
    pub fn nesting_depth(&self) -> usize {
        match self {
            Value::List(items) => 1 + items.iter().map(Value::nesting_depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Renders values in expression-literal syntax, so a displayed value can be
/// pasted back into a `path=value` statement.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the ".0" on integral floats
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Json(json) => write!(f, "{}", json),
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}
