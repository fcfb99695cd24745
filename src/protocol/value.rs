//! Decoded server data.
//!
//! Every element the server can send is represented by one of three shapes:
//! a [`Value`] (scalars, blobs, strings and lists), a [`Row`] of values, or a
//! [`Response`] wrapping exactly one top-level element. Integer and float
//! variants keep the width the server tagged them with, so a `UInt8` and a
//! `UInt64` stay distinguishable through [`Value`]'s accessors.
//!
//! # Equality
//!
//! Comparing two values compares their decoded content and ignores the width
//! tag: `UInt8(255) == UInt64(255)`, and `SInt16(-1) == SInt64(-1)`. Integers of
//! any width and signedness compare by magnitude, floats compare after widening
//! to `f64`, and lists compare element by element with the same rule. Values
//! of different kinds (a bool and an integer, a string and a blob) are never
//! equal. Match on the variant when the width matters.
use std::fmt;

/// A single decoded value.
///
/// Integer variants carry the magnitude sent by the server in a 64-bit
/// carrier; the width tag records which wire type produced it and does not
/// narrow the magnitude.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    UInt8(u64),
    UInt16(u64),
    UInt32(u64),
    UInt64(u64),
    SInt8(i64),
    SInt16(i64),
    SInt32(i64),
    SInt64(i64),
    Float32(f32),
    Float64(f64),
    Binary(Vec<u8>),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Magnitude of any unsigned variant.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt8(v) | Value::UInt16(v) | Value::UInt32(v) | Value::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Magnitude of any signed variant.
    pub fn as_sint(&self) -> Option<i64> {
        match self {
            Value::SInt8(v) | Value::SInt16(v) | Value::SInt32(v) | Value::SInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Magnitude of any integer variant, signed or unsigned.
    pub fn as_int(&self) -> Option<i128> {
        self.as_uint()
            .map(i128::from)
            .or_else(|| self.as_sint().map(i128::from))
    }

    /// Any float variant, widened to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => {
                if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
                    return a == b;
                }
                match (self.as_float(), other.as_float()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::UInt8(v) | Value::UInt16(v) | Value::UInt32(v) | Value::UInt64(v) => {
                write!(f, "{v}")
            }
            Value::SInt8(v) | Value::SInt16(v) | Value::SInt32(v) | Value::SInt64(v) => {
                write!(f, "{v}")
            }
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Binary(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                write_separated(f, items)?;
                write!(f, "]")
            }
        }
    }
}

/// An ordered set of columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<Value>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Value] {
        &self.columns
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.columns.get(index)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_columns(self) -> Vec<Value> {
        self.columns
    }
}

impl From<Vec<Value>> for Row {
    fn from(columns: Vec<Value>) -> Self {
        Self { columns }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        write_separated(f, &self.columns)?;
        write!(f, ")")
    }
}

/// Server-defined error identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    pub fn code(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server error code {}", self.0)
    }
}

/// A complete reply to one query. Holds exactly one top-level element.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Value(Value),
    Row(Row),
    Rows(Vec<Row>),
    Error(ErrorCode),
    Empty,
}

impl Response {
    pub fn is_empty(&self) -> bool {
        matches!(self, Response::Empty)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Response::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn row(&self) -> Option<&Row> {
        match self {
            Response::Row(r) => Some(r),
            _ => None,
        }
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Response::Rows(r) => Some(r),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<u16> {
        match self {
            Response::Error(e) => Some(e.code()),
            _ => None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Value(v) => write!(f, "{v}"),
            Response::Row(r) => write!(f, "{r}"),
            Response::Rows(rows) => {
                if rows.is_empty() {
                    return write!(f, "(no rows)");
                }
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{row}")?;
                }
                Ok(())
            }
            Response::Error(e) => write!(f, "{e}"),
            Response::Empty => write!(f, "(Okay)"),
        }
    }
}

fn write_separated(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
