//! Value codec
//!
//! Every value is a one-byte tag followed by a payload. Integers are fixed
//! width and big-endian.
//!
//! ```text
//! 'I' [i64 BE]
//! 'F' [f64 BE, IEEE-754 bits]
//! 'B' [u8: 0 or 1]
//! 'S' [len: u32 BE] [UTF-8 bytes]
//! 'J' [len: u32 BE] [JSON text]
//! 'L' [count: u32 BE] [value]*count
//! ```
//!
//! Decoding never trusts the input: lengths are checked against the bytes
//! that remain, list nesting is bounded, and any malformation is reported as
//! [`Error::CorruptSnapshot`].

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use configx_core::{Error, Result, Value, MAX_NESTING_DEPTH};
use std::io::Write;

/// Tag for `Value::Int`
pub const TAG_INT: u8 = b'I';
/// Tag for `Value::Float`
pub const TAG_FLOAT: u8 = b'F';
/// Tag for `Value::Bool`
pub const TAG_BOOL: u8 = b'B';
/// Tag for `Value::Str`
pub const TAG_STR: u8 = b'S';
/// Tag for `Value::Json`
pub const TAG_JSON: u8 = b'J';
/// Tag for `Value::List`
pub const TAG_LIST: u8 = b'L';

/// Smallest possible encoded value (a Bool: tag + one byte)
const MIN_ENCODED_VALUE: usize = 2;

/// Encode a value to a fresh buffer
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_value(&mut out, value)?;
    Ok(out)
}

/// Append the encoding of `value` to `writer`
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::Int(i) => {
            writer.write_u8(TAG_INT)?;
            writer.write_i64::<BigEndian>(*i)?;
        }
        Value::Float(f) => {
            writer.write_u8(TAG_FLOAT)?;
            writer.write_f64::<BigEndian>(*f)?;
        }
        Value::Bool(b) => {
            writer.write_u8(TAG_BOOL)?;
            writer.write_u8(u8::from(*b))?;
        }
        Value::Str(s) => {
            writer.write_u8(TAG_STR)?;
            write_bytes(writer, s.as_bytes())?;
        }
        Value::Json(json) => {
            let text = serde_json::to_vec(json)
                .map_err(|e| Error::Io { reason: e.to_string() })?;
            writer.write_u8(TAG_JSON)?;
            write_bytes(writer, &text)?;
        }
        Value::List(items) => {
            writer.write_u8(TAG_LIST)?;
            writer.write_u32::<BigEndian>(checked_len(items.len())?)?;
            for item in items {
                write_value(writer, item)?;
            }
        }
    }
    Ok(())
}

/// Write a u32-length-prefixed byte string
pub(crate) fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_u32::<BigEndian>(checked_len(bytes.len())?)?;
    writer.write_all(bytes)?;
    Ok(())
}

fn checked_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Io {
        reason: format!("length {} does not fit the u32 length prefix", len),
    })
}

/// Decode one value from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed; trailing bytes are
/// left for the caller.
pub fn decode(bytes: &[u8]) -> Result<(Value, usize)> {
    let mut reader = ValueReader::new(bytes, MAX_NESTING_DEPTH);
    let value = reader.read_value()?;
    Ok((value, reader.consumed()))
}

/// Bounds-checked cursor over encoded bytes
pub struct ValueReader<'a> {
    input: &'a [u8],
    rest: &'a [u8],
    max_depth: usize,
}

impl<'a> ValueReader<'a> {
    /// Create a reader that rejects lists nested deeper than `max_depth`
    pub fn new(input: &'a [u8], max_depth: usize) -> Self {
        ValueReader {
            input,
            rest: input,
            max_depth,
        }
    }

    /// Bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.input.len() - self.rest.len()
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.rest.first().copied()
    }

    /// Read one byte
    pub fn read_u8(&mut self, what: &str) -> Result<u8> {
        self.rest.read_u8().map_err(|_| truncated(what))
    }

    /// Read a big-endian u32
    pub fn read_u32(&mut self, what: &str) -> Result<u32> {
        self.rest.read_u32::<BigEndian>().map_err(|_| truncated(what))
    }

    /// Read a u32-length-prefixed byte string
    pub fn read_bytes(&mut self, what: &str) -> Result<&'a [u8]> {
        let len = self.read_u32(what)? as usize;
        if len > self.rest.len() {
            return Err(Error::corrupt(format!(
                "{} declares {} bytes but only {} remain",
                what,
                len,
                self.rest.len()
            )));
        }
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head)
    }

    /// Read a u32-length-prefixed UTF-8 string
    pub fn read_string(&mut self, what: &str) -> Result<String> {
        let bytes = self.read_bytes(what)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::corrupt(format!("{} is not valid UTF-8", what)))
    }

    /// Read one tagged value
    pub fn read_value(&mut self) -> Result<Value> {
        self.value_at_depth(0)
    }

    fn value_at_depth(&mut self, depth: usize) -> Result<Value> {
        let tag = self.read_u8("value tag")?;
        match tag {
            TAG_INT => self
                .rest
                .read_i64::<BigEndian>()
                .map(Value::Int)
                .map_err(|_| truncated("Int payload")),
            TAG_FLOAT => self
                .rest
                .read_f64::<BigEndian>()
                .map(Value::Float)
                .map_err(|_| truncated("Float payload")),
            TAG_BOOL => match self.read_u8("Bool payload")? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(Error::corrupt(format!("invalid Bool byte {}", other))),
            },
            TAG_STR => self.read_string("Str payload").map(Value::Str),
            TAG_JSON => {
                let text = self.read_bytes("Json payload")?;
                serde_json::from_slice(text)
                    .map(Value::Json)
                    .map_err(|e| Error::corrupt(format!("invalid Json payload: {}", e)))
            }
            TAG_LIST => {
                if depth >= self.max_depth {
                    return Err(Error::corrupt(format!(
                        "list nesting exceeds {} levels",
                        self.max_depth
                    )));
                }
                let count = self.read_u32("List count")? as usize;
                if count > self.rest.len() / MIN_ENCODED_VALUE {
                    return Err(Error::corrupt(format!(
                        "List declares {} elements but only {} bytes remain",
                        count,
                        self.rest.len()
                    )));
                }
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.value_at_depth(depth + 1)?);
                }
                Ok(Value::List(items))
            }
            other => Err(Error::corrupt(format!("unknown value tag 0x{:02x}", other))),
        }
    }
}

fn truncated(what: &str) -> Error {
    Error::corrupt(format!("truncated {}", what))
}
