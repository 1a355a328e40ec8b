//! Expression AST
//!
//! A [`PathExpression`] is built fresh for every call and never persisted.
//! It is made of a dotted base path, a chain of [`Accessor`]s applied left
//! to right, the [`Operation`] to perform and the safe-mode flag.
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `a.b.c` | Base path |
//! | `[n]` | Index (negative counts from the end) |
//! | `[a:b:c]` | Slice (read-only, exclusive end) |
//! | `[*]` | Wildcard |
//! | `[lo..hi]` | Range (inclusive) |
//! | `[?>90]`, `[?.age>=30]` | Filter |
//! | `[*].name` | Field projection |

use crate::value::Value;
use smallvec::SmallVec;
use std::fmt;

/// Accessor chains are almost always short
pub type AccessorChain = SmallVec<[Accessor; 4]>;

/// Comparison operator used by filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
}

impl CompareOp {
    /// Source form of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }

    /// Whether the operator needs an ordering (numeric operands)
    pub fn is_ordering(&self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

/// Elementwise predicate of a filter accessor
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Compare this field of each map element instead of the element itself
    pub field: Option<String>,
    /// Comparison operator
    pub op: CompareOp,
    /// Right-hand side
    pub literal: Value,
}

/// One step of an accessor chain
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// `[i]`
    Index(i64),
    /// `[start:end:step]`
    Slice {
        /// Start bound, defaulted by the sign of step
        start: Option<i64>,
        /// End bound (exclusive), defaulted by the sign of step
        end: Option<i64>,
        /// Step, defaults to 1, never 0
        step: Option<i64>,
    },
    /// `[*]`
    Wildcard,
    /// `[lo..hi]`, both bounds inclusive
    Range {
        /// First selected index
        lo: i64,
        /// Last selected index
        hi: i64,
    },
    /// `[?op literal]`
    Filter(Filter),
    /// `.name` directly after a wildcard or filter
    FieldProjection(String),
}

impl Accessor {
    /// Whether this accessor selects a set of elements (wildcard, range, filter)
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            Accessor::Wildcard | Accessor::Range { .. } | Accessor::Filter(_)
        )
    }
}

/// Named read-only query with its argument, if any
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// `!len`
    Len,
    /// `!contains=v`
    Contains(Value),
    /// `!index=v`
    Index(Value),
    /// `!sum`
    Sum,
    /// `!min`
    Min,
    /// `!max`
    Max,
    /// `!reverse`
    Reverse,
}

impl Query {
    /// Name as written after `!`
    pub fn name(&self) -> &'static str {
        match self {
            Query::Len => "len",
            Query::Contains(_) => "contains",
            Query::Index(_) => "index",
            Query::Sum => "sum",
            Query::Min => "min",
            Query::Max => "max",
            Query::Reverse => "reverse",
        }
    }
}

/// Statement kind selected by the operation suffix
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// No suffix
    Get,
    /// Trailing `!`
    SafeGet,
    /// `=value`
    Set(Value),
    /// `+=value`
    Append(Value),
    /// `+N=value`
    Insert {
        /// Position to insert before
        index: i64,
        /// Inserted element
        value: Value,
    },
    /// `path-`
    DeleteWhole,
    /// `path[...]-`
    DeleteSelected,
    /// `path[-]=value`
    RemoveByValue(Value),
    /// `!name[=arg]`
    Query(Query),
}

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    /// Dotted base path segments
    pub path: Vec<String>,
    /// Accessors applied to the value at `path`, left to right
    pub accessors: AccessorChain,
    /// What to do with the result
    pub operation: Operation,
    /// Convert not-found / out-of-bounds failures into an absent result
    pub safe: bool,
}

impl PathExpression {
    /// Statements that never mutate the tree
    pub fn is_read_only(&self) -> bool {
        matches!(
            self.operation,
            Operation::Get | Operation::SafeGet | Operation::Query(_)
        )
    }

    /// The base path joined with dots
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(b: &Option<i64>) -> String {
            b.map(|v| v.to_string()).unwrap_or_default()
        }
        match self {
            Accessor::Index(i) => write!(f, "[{}]", i),
            Accessor::Slice { start, end, step } => match step {
                Some(s) => write!(f, "[{}:{}:{}]", bound(start), bound(end), s),
                None => write!(f, "[{}:{}]", bound(start), bound(end)),
            },
            Accessor::Wildcard => f.write_str("[*]"),
            Accessor::Range { lo, hi } => write!(f, "[{}..{}]", lo, hi),
            Accessor::Filter(filter) => match &filter.field {
                Some(field) => write!(f, "[?.{}{}{}]", field, filter.op, filter.literal),
                None => write!(f, "[?{}{}]", filter.op, filter.literal),
            },
            Accessor::FieldProjection(name) => write!(f, ".{}", name),
        }
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_string())?;
        for accessor in &self.accessors {
            write!(f, "{}", accessor)?;
        }
        match &self.operation {
            Operation::Get => Ok(()),
            Operation::SafeGet => f.write_str("!"),
            Operation::Set(v) => write!(f, "={}", v),
            Operation::Append(v) => write!(f, "+={}", v),
            Operation::Insert { index, value } => write!(f, "+{}={}", index, value),
            Operation::DeleteWhole | Operation::DeleteSelected => f.write_str("-"),
            Operation::RemoveByValue(v) => write!(f, "[-]={}", v),
            Operation::Query(q) => match q {
                Query::Contains(v) | Query::Index(v) => write!(f, "!{}={}", q.name(), v),
                _ => write!(f, "!{}", q.name()),
            },
        }
    }
}
