//! Resumable Skyhash response decoder.
//!
//! The [`Decoder`] owns an append-only buffer of bytes read from the server
//! and a committed position into it. Each call to
//! [`Decoder::try_parse_response`] parses from the committed position on a
//! scratch cursor and only moves the committed position when a whole
//! response was decoded. When the buffer ends inside an element the call
//! reports `Ok(None)` and leaves the position untouched, so the caller can
//! append more bytes and retry the same element from the same offset.
//!
//! Every element is parsed under `Cursor::attempt`, so an element that
//! cannot finish (a list whose third child is cut short, a string whose body
//! has not arrived) rewinds to its own type tag.
//!
//! # Example
//! ```rust
//! use skyhash::protocol::{Decoder, Response, Value};
//!
//! let mut decoder = Decoder::new();
//! decoder.append(b"\x0D11\nhello");
//! assert_eq!(decoder.try_parse_response().unwrap(), None);
//! assert_eq!(decoder.position(), 0);
//!
//! decoder.append(b" world");
//! let resp = decoder.try_parse_response().unwrap();
//! assert_eq!(resp, Some(Response::Value(Value::from("hello world"))));
//! ```
use std::str::FromStr;

use super::{
    cursor::{Cursor, Interrupt, Step},
    error::ProtocolError,
    value::{ErrorCode, Response, Row, Value},
};

/// Type tags of the server to client direction.
pub mod tag {
    pub const NULL: u8 = 0;
    pub const BOOL: u8 = 1;
    pub const UINT8: u8 = 2;
    pub const UINT16: u8 = 3;
    pub const UINT32: u8 = 4;
    pub const UINT64: u8 = 5;
    pub const SINT8: u8 = 6;
    pub const SINT16: u8 = 7;
    pub const SINT32: u8 = 8;
    pub const SINT64: u8 = 9;
    pub const FLOAT32: u8 = 10;
    pub const FLOAT64: u8 = 11;
    pub const BINARY: u8 = 12;
    pub const STRING: u8 = 13;
    pub const LIST: u8 = 14;
    pub const DICTIONARY: u8 = 15;
    pub const ERROR_CODE: u8 = 16;
    pub const ROW: u8 = 17;
    pub const EMPTY: u8 = 18;
    pub const ROW_SET: u8 = 19;
}

const LF: u8 = b'\n';

/// Maximum depth of nested lists.
const MAX_NESTING_DEPTH: usize = 64;

/// Upper bound for up-front `Vec` allocation from a declared count. The
/// vector still grows past it as elements are parsed.
const PREALLOC_CAP: usize = 1024;

#[derive(Debug, Default)]
pub struct Decoder {
    buf: Vec<u8>,
    pos: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bytes read from the server to the end of the buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Offset of the first byte that has not been consumed by a response.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of buffered bytes not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Drops the bytes consumed by earlier responses.
    pub fn compact(&mut self) {
        self.buf.drain(..self.pos);
        self.pos = 0;
    }

    /// Discards everything buffered, including a partially received response.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }

    /// Parses the next response from the committed position.
    ///
    /// Returns `Ok(Some(response))` and moves past it when a whole response is
    /// buffered, `Ok(None)` without moving when more bytes are needed, or the
    /// protocol error raised by malformed data.
    pub fn try_parse_response(&mut self) -> Result<Option<Response>, ProtocolError> {
        let mut cursor = Cursor::new(&self.buf, self.pos);

        match next_response(&mut cursor) {
            Ok(resp) => {
                self.pos = cursor.position();
                Ok(Some(resp))
            }
            Err(Interrupt::Incomplete) => Ok(None),
            Err(Interrupt::Protocol(e)) => Err(e),
        }
    }
}

fn next_response(cursor: &mut Cursor<'_>) -> Step<Response> {
    cursor.attempt(|c| {
        let ty = c.next_byte()?;
        match ty {
            tag::ERROR_CODE => {
                let code = c.take(2)?;
                Ok(Response::Error(ErrorCode(u16::from_le_bytes([
                    code[0], code[1],
                ]))))
            }
            tag::ROW => row_body(c).map(Response::Row),
            tag::EMPTY => Ok(Response::Empty),
            tag::ROW_SET => {
                let count = read_count(c)?;
                let mut rows = Vec::with_capacity(count.min(PREALLOC_CAP));
                for _ in 0..count {
                    rows.push(c.attempt(row_body)?);
                }
                Ok(Response::Rows(rows))
            }
            ty => value_body(c, ty, 0).map(Response::Value),
        }
    })
}

/// Parses one tagged element that must be a [`Value`], as found inside a
/// list or a row.
fn next_value(cursor: &mut Cursor<'_>, depth: usize) -> Step<Value> {
    cursor.attempt(|c| {
        let ty = c.next_byte()?;
        match ty {
            tag::ERROR_CODE | tag::ROW | tag::EMPTY | tag::ROW_SET => {
                Err(ProtocolError::UnexpectedElement(ty).into())
            }
            ty => value_body(c, ty, depth),
        }
    })
}

fn value_body(c: &mut Cursor<'_>, ty: u8, depth: usize) -> Step<Value> {
    match ty {
        tag::NULL => Ok(Value::Null),
        tag::BOOL => match c.next_byte()? {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            byte => Err(ProtocolError::InvalidBoolean(byte).into()),
        },
        tag::UINT8 => read_uint(c).map(Value::UInt8),
        tag::UINT16 => read_uint(c).map(Value::UInt16),
        tag::UINT32 => read_uint(c).map(Value::UInt32),
        tag::UINT64 => read_uint(c).map(Value::UInt64),
        tag::SINT8 => read_sint(c).map(Value::SInt8),
        tag::SINT16 => read_sint(c).map(Value::SInt16),
        tag::SINT32 => read_sint(c).map(Value::SInt32),
        tag::SINT64 => read_sint(c).map(Value::SInt64),
        tag::FLOAT32 => read_float(c).map(Value::Float32),
        tag::FLOAT64 => read_float(c).map(Value::Float64),
        tag::BINARY => read_blob(c).map(|blob| Value::Binary(blob.to_vec())),
        tag::STRING => {
            let blob = read_blob(c)?;
            let s = std::str::from_utf8(blob).map_err(|_| ProtocolError::InvalidUtf8)?;
            Ok(Value::String(s.to_owned()))
        }
        tag::LIST => {
            let depth = depth + 1;
            if depth > MAX_NESTING_DEPTH {
                return Err(ProtocolError::NestingTooDeep(MAX_NESTING_DEPTH).into());
            }
            let count = read_count(c)?;
            collect_values(c, count, depth).map(Value::List)
        }
        tag::DICTIONARY => Err(ProtocolError::DictionaryUnsupported.into()),
        other => Err(ProtocolError::UnknownType(other).into()),
    }
}

/// `<column count>\n` followed by that many tagged values.
fn row_body(c: &mut Cursor<'_>) -> Step<Row> {
    let count = read_count(c)?;
    collect_values(c, count, 1).map(Row::new)
}

fn collect_values(c: &mut Cursor<'_>, count: usize, depth: usize) -> Step<Vec<Value>> {
    let mut values = Vec::with_capacity(count.min(PREALLOC_CAP));
    for _ in 0..count {
        values.push(next_value(c, depth)?);
    }
    Ok(values)
}

/// Reads ASCII digits up to `terminator` and moves past the terminator.
///
/// A non-digit is reported as soon as it is seen, even if the terminator has
/// not arrived yet.
fn read_digits<'a>(cursor: &mut Cursor<'a>, terminator: u8) -> Step<&'a [u8]> {
    cursor.attempt(|c| {
        let start = c.position();
        loop {
            match c.next_byte()? {
                b if b == terminator => break,
                b if b.is_ascii_digit() => {}
                _ => return Err(ProtocolError::InvalidInteger.into()),
            }
        }
        let digits = c.since(start);
        let digits = &digits[..digits.len() - 1];
        if digits.is_empty() {
            return Err(ProtocolError::InvalidInteger.into());
        }
        Ok(digits)
    })
}

fn read_uint(c: &mut Cursor<'_>) -> Step<u64> {
    let digits = read_digits(c, LF)?;
    digits
        .iter()
        .try_fold(0u64, |acc, &d| {
            acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
        })
        .ok_or_else(|| ProtocolError::InvalidInteger.into())
}

fn read_count(c: &mut Cursor<'_>) -> Step<usize> {
    let count = read_uint(c)?;
    usize::try_from(count).map_err(|_| ProtocolError::InvalidInteger.into())
}

/// Consumes a leading `-` if present.
fn read_sign(c: &mut Cursor<'_>) -> Step<bool> {
    match c.peek() {
        None => Err(Interrupt::Incomplete),
        Some(b'-') => {
            c.next_byte()?;
            Ok(true)
        }
        Some(_) => Ok(false),
    }
}

fn read_sint(c: &mut Cursor<'_>) -> Step<i64> {
    let negative = read_sign(c)?;
    let magnitude = i128::from(read_uint(c)?);
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| ProtocolError::InvalidInteger.into())
}

/// `[-]<whole>.<fraction>\n`, parsed from the digits exactly as sent.
fn read_float<T: FromStr>(c: &mut Cursor<'_>) -> Step<T> {
    let negative = read_sign(c)?;
    let whole = read_digits(c, b'.')?;
    let fraction = read_digits(c, LF)?;

    let mut text = String::with_capacity(whole.len() + fraction.len() + 2);
    if negative {
        text.push('-');
    }
    text.extend(whole.iter().map(|&b| char::from(b)));
    text.push('.');
    text.extend(fraction.iter().map(|&b| char::from(b)));

    match text.parse::<T>() {
        Ok(v) => Ok(v),
        Err(_) => Err(ProtocolError::InvalidFloat(text).into()),
    }
}

/// `<length>\n` followed by exactly that many raw bytes.
fn read_blob<'a>(c: &mut Cursor<'a>) -> Step<&'a [u8]> {
    let len = read_count(c)?;
    c.take(len)
}
