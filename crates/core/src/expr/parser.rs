//! Recursive-descent parser for path expressions
//!
//! ```text
//! statement  := path chain suffix
//! path       := ident ('.' ident)*
//! chain      := (accessor | '.' ident)* ['[-]']
//! accessor   := '[' ( '*' | '?' ['.' ident] cmp literal
//!                   | int | [int] ':' [int] [':' [int]] | int '..' int ) ']'
//! suffix     := ε | '!' | '!' ident ['=' literal] | '-' | '=' literal
//!             | '+=' literal | '+' int '=' literal
//! literal    := string | int | float | bool | list | object
//! ```
//!
//! The cursor walks bytes; every delimiter is ASCII, so multi-byte UTF-8
//! inside string literals never matches one.

use super::ast::{Accessor, AccessorChain, CompareOp, Filter, Operation, PathExpression, Query};
use crate::error::{Error, Result};
use crate::limits::{MAX_EXPRESSION_LENGTH, MAX_NESTING_DEPTH, MAX_PATH_LENGTH};
use crate::value::Value;

/// Parse a statement into a [`PathExpression`].
///
/// # Errors
///
/// `InvalidSyntax` for malformed input: unbalanced brackets, invalid
/// literals, unknown comparison operators, ambiguous suffixes such as
/// `a!-`, unsupported write targets such as slice assignment.
///
/// # Examples
///
/// ```
/// use configx_core::expr::{parse, Accessor, Operation};
/// use configx_core::Value;
///
/// let expr = parse("items[0]=99").unwrap();
/// assert_eq!(expr.path, vec!["items".to_string()]);
/// assert_eq!(expr.accessors.as_slice(), &[Accessor::Index(0)]);
/// assert_eq!(expr.operation, Operation::Set(Value::Int(99)));
/// ```
pub fn parse(input: &str) -> Result<PathExpression> {
    if input.len() > MAX_EXPRESSION_LENGTH {
        return Err(Error::syntax(
            0,
            format!("expression exceeds {} bytes", MAX_EXPRESSION_LENGTH),
        ));
    }
    Parser::new(input).statement()
}

/// Parse a standalone literal such as `[1, "a", true]`
pub fn parse_literal(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    let value = parser.literal(0)?;
    parser.skip_ws();
    parser.expect_end()?;
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser { src, pos: 0 }
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos >= self.src.len() {
            Ok(())
        } else {
            Err(self.error(format!("unexpected trailing input '{}'", self.rest())))
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::syntax(self.pos, reason)
    }

    fn unexpected(&self, context: &str) -> Error {
        match self.peek_char() {
            Some(c) => self.error(format!("unexpected '{}' {}", c, context)),
            None => self.error(format!("unexpected end of input {}", context)),
        }
    }

    // ------------------------------------------------------------------
    // Statement
    // ------------------------------------------------------------------

    fn statement(&mut self) -> Result<PathExpression> {
        self.skip_ws();
        let path = self.base_path()?;
        let (accessors, remove_marker) = self.accessor_chain()?;
        let chain_end = self.pos;
        self.skip_ws();
        let operation = self.operation(!accessors.is_empty(), remove_marker)?;
        self.skip_ws();
        self.expect_end()?;
        validate_targets(&accessors, &operation, chain_end)?;

        let safe = matches!(operation, Operation::SafeGet);
        Ok(PathExpression {
            path,
            accessors,
            operation,
            safe,
        })
    }

    fn base_path(&mut self) -> Result<Vec<String>> {
        let mut segments = vec![self.identifier("a path segment")?];
        while self.peek() == Some(b'.') {
            self.bump();
            segments.push(self.identifier("a path segment after '.'")?);
        }
        if segments.len() > MAX_PATH_LENGTH {
            return Err(Error::syntax(
                0,
                format!("path exceeds {} segments", MAX_PATH_LENGTH),
            ));
        }
        Ok(segments)
    }

    fn identifier(&mut self, what: &str) -> Result<String> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.bump(),
            _ => return Err(self.error(format!("expected {}", what))),
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.bump();
        }
        Ok(self.src[start..self.pos].to_string())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the chain and whether it ended with the `[-]` marker.
    fn accessor_chain(&mut self) -> Result<(AccessorChain, bool)> {
        let mut chain = AccessorChain::new();
        loop {
            match self.peek() {
                Some(b'[') => {
                    if matches!(chain.last(), Some(Accessor::FieldProjection(_))) {
                        return Err(self.error("no accessor may follow a field projection"));
                    }
                    let open = self.pos;
                    self.bump();
                    // `[-]` is a fixed token, checked before any index parsing
                    if self.rest().starts_with("-]") {
                        self.pos += 2;
                        return Ok((chain, true));
                    }
                    chain.push(self.accessor(open)?);
                }
                Some(b'.') => match chain.last() {
                    Some(Accessor::Wildcard | Accessor::Filter(_)) => {
                        self.bump();
                        let name = self.identifier("a field name after '.'")?;
                        chain.push(Accessor::FieldProjection(name));
                    }
                    _ => {
                        return Err(
                            self.error("field projection must follow a wildcard or filter")
                        )
                    }
                },
                _ => return Ok((chain, false)),
            }
        }
    }

    fn accessor(&mut self, open: usize) -> Result<Accessor> {
        self.skip_ws();
        let accessor = match self.peek() {
            Some(b'*') => {
                self.bump();
                Accessor::Wildcard
            }
            Some(b'?') => {
                self.bump();
                Accessor::Filter(self.filter()?)
            }
            Some(b']') => return Err(self.error("empty accessor '[]'")),
            None => return Err(Error::syntax(open, "unbalanced '['")),
            _ => self.index_like()?,
        };
        self.skip_ws();
        match self.peek() {
            Some(b']') => {
                self.bump();
                Ok(accessor)
            }
            None => Err(Error::syntax(open, "unbalanced '['")),
            Some(_) => Err(self.unexpected("in accessor, expected ']'")),
        }
    }

    /// Index, slice or range: whatever starts with an optional integer.
    fn index_like(&mut self) -> Result<Accessor> {
        let first = self.signed_int()?;
        self.skip_ws();

        if self.eat(b':') {
            self.skip_ws();
            let end = self.signed_int()?;
            self.skip_ws();
            let step = if self.eat(b':') {
                self.skip_ws();
                self.signed_int()?
            } else {
                None
            };
            if step == Some(0) {
                return Err(self.error("slice step cannot be zero"));
            }
            return Ok(Accessor::Slice {
                start: first,
                end,
                step,
            });
        }

        if self.rest().starts_with("..") {
            let lo = first.ok_or_else(|| self.error("range requires a lower bound"))?;
            self.pos += 2;
            self.skip_ws();
            let hi = self
                .signed_int()?
                .ok_or_else(|| self.error("range requires an upper bound"))?;
            return Ok(Accessor::Range { lo, hi });
        }

        first
            .map(Accessor::Index)
            .ok_or_else(|| self.unexpected("in accessor, expected index, slice, range, '*' or '?'"))
    }

    fn signed_int(&mut self) -> Result<Option<i64>> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.bump();
        }
        let digits = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.bump();
        }
        if self.pos == digits {
            if self.pos != start {
                return Err(Error::syntax(start, "expected digits after sign"));
            }
            return Ok(None);
        }
        self.src[start..self.pos]
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::syntax(start, "integer out of range"))
    }

    fn filter(&mut self) -> Result<Filter> {
        self.skip_ws();
        let field = if self.eat(b'.') {
            Some(self.identifier("a field name after '?.'")?)
        } else {
            None
        };
        self.skip_ws();
        let op = self.compare_op()?;
        self.skip_ws();
        let literal = self.literal(0)?;
        Ok(Filter { field, op, literal })
    }

    fn compare_op(&mut self) -> Result<CompareOp> {
        const OPS: [(&str, CompareOp); 6] = [
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            (">=", CompareOp::Ge),
            ("<=", CompareOp::Le),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
        ];
        let rest = self.rest();
        for (symbol, op) in OPS {
            if rest.starts_with(symbol) {
                self.pos += symbol.len();
                if matches!(self.peek(), Some(b'=' | b'<' | b'>' | b'!')) {
                    break;
                }
                return Ok(op);
            }
        }
        Err(self.error("unknown comparison operator"))
    }

    // ------------------------------------------------------------------
    // Operation suffix
    // ------------------------------------------------------------------

    fn operation(&mut self, has_accessors: bool, remove_marker: bool) -> Result<Operation> {
        if remove_marker {
            if !self.eat(b'=') {
                return Err(self.error("'[-]' must be followed by '=value'"));
            }
            return Ok(Operation::RemoveByValue(self.operand()?));
        }

        match self.peek() {
            None => Ok(Operation::Get),
            Some(b'!') => {
                self.bump();
                self.bang_suffix()
            }
            Some(b'-') => {
                self.bump();
                self.skip_ws();
                if self.peek() == Some(b'!') {
                    return Err(self.error("ambiguous suffix: delete '-' combined with safe '!'"));
                }
                if has_accessors {
                    Ok(Operation::DeleteSelected)
                } else {
                    Ok(Operation::DeleteWhole)
                }
            }
            Some(b'=') => {
                self.bump();
                Ok(Operation::Set(self.operand()?))
            }
            Some(b'+') => {
                self.bump();
                if self.eat(b'=') {
                    return Ok(Operation::Append(self.operand()?));
                }
                let at = self.pos;
                let index = self.signed_int()?.ok_or_else(|| {
                    Error::syntax(at, "expected '=' or an insert position after '+'")
                })?;
                self.skip_ws();
                if !self.eat(b'=') {
                    return Err(self.error("expected '=' after insert position"));
                }
                let value = self.operand()?;
                Ok(Operation::Insert { index, value })
            }
            Some(_) => Err(self.unexpected("after path")),
        }
    }

    fn bang_suffix(&mut self) -> Result<Operation> {
        self.skip_ws();
        match self.peek() {
            None => Ok(Operation::SafeGet),
            Some(b'-') => Err(self.error("ambiguous suffix: safe '!' combined with delete '-'")),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                let at = self.pos;
                let name = self.identifier("a query name")?;
                self.skip_ws();
                let arg = if self.eat(b'=') {
                    Some(self.operand()?)
                } else {
                    None
                };
                build_query(&name, arg, at).map(Operation::Query)
            }
            Some(_) => Err(self.unexpected("after '!'")),
        }
    }

    fn operand(&mut self) -> Result<Value> {
        self.skip_ws();
        self.literal(0)
    }

    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------

    fn literal(&mut self, depth: usize) -> Result<Value> {
        match self.peek() {
            Some(b'"') => self.string().map(Value::Str),
            Some(b'\'') => Err(self.error("strings must be double-quoted")),
            Some(b'[') => self.list(depth),
            Some(b'{') => self.object(),
            Some(b) if b == b'-' || b == b'+' || b == b'.' || b.is_ascii_digit() => self.number(),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.keyword(),
            Some(_) => Err(self.unexpected("where a value was expected")),
            None => Err(self.error("expected a value")),
        }
    }

    fn keyword(&mut self) -> Result<Value> {
        let start = self.pos;
        let word = self.identifier("a value")?;
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::syntax(
                start,
                format!("unquoted string '{}'; strings must be double-quoted", word),
            )),
        }
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.bump();
        }
        let mut is_float = false;
        let mut digits = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => digits += 1,
                b'.' => is_float = true,
                b'e' | b'E' => {
                    is_float = true;
                    if matches!(self.peek_at(1), Some(b'-' | b'+')) {
                        self.bump();
                    }
                }
                _ => break,
            }
            self.bump();
        }

        let text = &self.src[start..self.pos];
        if digits == 0 {
            return Err(Error::syntax(start, format!("invalid number '{}'", text)));
        }
        if is_float {
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|_| Error::syntax(start, format!("invalid float literal '{}'", text)))
        } else {
            text.parse::<i64>().map(Value::Int).map_err(|_| {
                Error::syntax(start, format!("integer literal '{}' out of range", text))
            })
        }
    }

    fn string(&mut self) -> Result<String> {
        let open = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            let c = self
                .peek_char()
                .ok_or_else(|| Error::syntax(open, "unterminated string literal"))?;
            self.pos += c.len_utf8();
            match c {
                '"' => return Ok(out),
                '\\' => out.push(self.escape()?),
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char> {
        let at = self.pos;
        let c = self
            .peek_char()
            .ok_or_else(|| Error::syntax(at, "unterminated escape sequence"))?;
        self.pos += c.len_utf8();
        match c {
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            '/' => Ok('/'),
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            'b' => Ok('\u{8}'),
            'f' => Ok('\u{c}'),
            'u' => self.unicode_escape(at),
            other => Err(Error::syntax(at, format!("invalid escape '\\{}'", other))),
        }
    }

    fn unicode_escape(&mut self, at: usize) -> Result<char> {
        let high = self.hex4()?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if !self.rest().starts_with("\\u") {
                return Err(Error::syntax(at, "unpaired surrogate in \\u escape"));
            }
            self.pos += 2;
            let low = self.hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(Error::syntax(at, "invalid low surrogate in \\u escape"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| Error::syntax(at, "invalid \\u escape"))
    }

    fn hex4(&mut self) -> Result<u32> {
        let digits = self
            .rest()
            .get(..4)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("expected four hex digits in \\u escape"))?;
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| self.error("expected four hex digits in \\u escape"))?;
        self.pos += 4;
        Ok(code)
    }

    fn list(&mut self, depth: usize) -> Result<Value> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(self.error(format!(
                "list literal nesting exceeds {} levels",
                MAX_NESTING_DEPTH
            )));
        }
        let open = self.pos;
        self.bump();
        let mut items = Vec::new();
        self.skip_ws();
        if self.eat(b']') {
            return Ok(Value::List(items));
        }
        loop {
            self.skip_ws();
            items.push(self.literal(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.bump(),
                Some(b']') => {
                    self.bump();
                    return Ok(Value::List(items));
                }
                None => return Err(Error::syntax(open, "unbalanced '[' in list literal")),
                Some(_) => return Err(self.unexpected("in list literal, expected ',' or ']'")),
            }
        }
    }

    /// `{...}` is handed to serde_json, which reports how much it consumed.
    fn object(&mut self) -> Result<Value> {
        let start = self.pos;
        let mut stream =
            serde_json::Deserializer::from_str(self.rest()).into_iter::<serde_json::Value>();
        match stream.next() {
            Some(Ok(json)) => {
                self.pos = start + stream.byte_offset();
                Ok(Value::Json(json))
            }
            Some(Err(e)) => Err(Error::syntax(start, format!("invalid object literal: {}", e))),
            None => Err(Error::syntax(start, "expected an object literal")),
        }
    }
}

fn build_query(name: &str, arg: Option<Value>, at: usize) -> Result<Query> {
    match (name, arg) {
        ("len", None) => Ok(Query::Len),
        ("sum", None) => Ok(Query::Sum),
        ("min", None) => Ok(Query::Min),
        ("max", None) => Ok(Query::Max),
        ("reverse", None) => Ok(Query::Reverse),
        ("contains", Some(v)) => Ok(Query::Contains(v)),
        ("index", Some(v)) => Ok(Query::Index(v)),
        ("contains" | "index", None) => Err(Error::syntax(
            at,
            format!("query '{}' requires an argument", name),
        )),
        ("len" | "sum" | "min" | "max" | "reverse", Some(_)) => Err(Error::syntax(
            at,
            format!("query '{}' takes no argument", name),
        )),
        _ => Err(Error::syntax(at, format!("unknown query '{}'", name))),
    }
}

/// Reject accessor chains a write cannot address.
///
/// List mutations (append, insert, remove-by-value) walk index accessors
/// only. Set and delete-selected allow one final selection step, plus an
/// optional projection, after an index-only prefix. Slices are read-only.
fn validate_targets(chain: &[Accessor], operation: &Operation, at: usize) -> Result<()> {
    let index_only = |steps: &[Accessor]| steps.iter().all(|a| matches!(a, Accessor::Index(_)));

    match operation {
        Operation::Get | Operation::SafeGet | Operation::Query(_) | Operation::DeleteWhole => Ok(()),
        Operation::Append(_) | Operation::Insert { .. } | Operation::RemoveByValue(_) => {
            if index_only(chain) {
                Ok(())
            } else {
                Err(Error::syntax(
                    at,
                    "list mutations address nested lists with index accessors only",
                ))
            }
        }
        Operation::Set(_) | Operation::DeleteSelected => {
            let body = match chain.split_last() {
                Some((Accessor::FieldProjection(_), rest)) => rest,
                _ => chain,
            };
            let Some((target, prefix)) = body.split_last() else {
                return Ok(());
            };
            if matches!(target, Accessor::Slice { .. }) {
                return Err(Error::syntax(
                    at,
                    "slice assignment is not supported; slices are read-only",
                ));
            }
            if !index_only(prefix) {
                return Err(Error::syntax(
                    at,
                    "only index accessors may precede the target of a write",
                ));
            }
            Ok(())
        }
    }
}
