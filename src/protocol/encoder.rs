//! Query encoding.
//!
//! A [`Query`] holds the query text and its encoded parameters. On the wire
//! it is sent as a metaframe followed by a dataframe:
//!
//! ```text
//! S<total size>\n<window>\n<query text><param><param>...
//! ```
//!
//! The window is the byte length of the query text, which lets the server
//! split the dataframe back into text and parameters. The total size counts
//! `<window>\n` and the whole dataframe.
//!
//! Parameters are limited to the kinds in [`Param`]. Plain Rust integers are not
//! accepted; wrap them in [`UInt`] or [`SInt`] to pick the
//! wire type.
//!
//! # Example
//! ```rust
//! use skyhash::{query, protocol::UInt};
//!
//! let q = query!("insert into db.db { name: ?, random_num: ? }", "sayan", UInt::new(300));
//! assert_eq!(q.param_count(), 2);
//! assert_eq!(q.window(), 44);
//! ```
use std::io::{self, Write};

use super::error::ValidationError;

/// Type tags of the client to server direction.
pub mod tag {
    pub const NULL: u8 = 0x00;
    pub const BOOL: u8 = 0x01;
    pub const UINT: u8 = 0x02;
    pub const SINT: u8 = 0x03;
    pub const FLOAT: u8 = 0x04;
    pub const BINARY: u8 = 0x05;
    pub const TEXT: u8 = 0x06;
}

/// Unsigned integer parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UInt(u64);

impl UInt {
    pub fn new(v: u64) -> Self {
        Self(v)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for UInt {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for UInt {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

impl TryFrom<i64> for UInt {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| ValidationError::NegativeUnsigned(value))
    }
}

impl TryFrom<i32> for UInt {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        i64::from(value).try_into()
    }
}

/// Signed integer parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SInt(i64);

impl SInt {
    pub fn new(v: i64) -> Self {
        Self(v)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for SInt {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i32> for SInt {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

/// A query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    UInt(UInt),
    SInt(SInt),
    Float(f64),
    Binary(Vec<u8>),
    Text(String),
}

impl Param {
    /// Float parameter. NaN and infinities have no decimal form and are
    /// rejected.
    pub fn float(v: f64) -> Result<Self, ValidationError> {
        if !v.is_finite() {
            return Err(ValidationError::Unsupported(format!("non-finite float {v}")));
        }
        Ok(Param::Float(v))
    }

    /// Encodes this parameter, returning the payload and the number of wire
    /// elements it occupies.
    pub fn encode(&self) -> (Vec<u8>, usize) {
        let mut buf = Vec::new();
        let arity = self.encode_into(&mut buf);
        (buf, arity)
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> usize {
        match self {
            Param::Null => buf.push(tag::NULL),
            Param::Bool(b) => {
                buf.push(tag::BOOL);
                buf.push(if *b { b'1' } else { b'0' });
            }
            Param::UInt(v) => write_line(buf, tag::UINT, &v.get().to_string()),
            Param::SInt(v) => write_line(buf, tag::SINT, &v.get().to_string()),
            Param::Float(v) => write_line(buf, tag::FLOAT, &v.to_string()),
            Param::Binary(b) => write_sized(buf, tag::BINARY, b),
            Param::Text(s) => write_sized(buf, tag::TEXT, s.as_bytes()),
        }
        1
    }
}

fn write_line(buf: &mut Vec<u8>, tag: u8, digits: &str) {
    buf.push(tag);
    buf.extend_from_slice(digits.as_bytes());
    buf.push(b'\n');
}

fn write_sized(buf: &mut Vec<u8>, tag: u8, payload: &[u8]) {
    write_line(buf, tag, &payload.len().to_string());
    buf.extend_from_slice(payload);
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<UInt> for Param {
    fn from(value: UInt) -> Self {
        Param::UInt(value)
    }
}

impl From<SInt> for Param {
    fn from(value: SInt) -> Self {
        Param::SInt(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<&[u8]> for Param {
    fn from(value: &[u8]) -> Self {
        Param::Binary(value.to_vec())
    }
}

impl From<Vec<u8>> for Param {
    fn from(value: Vec<u8>) -> Self {
        Param::Binary(value)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

impl TryFrom<f64> for Param {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Param::float(value)
    }
}

impl TryFrom<f32> for Param {
    type Error = ValidationError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Param::float(f64::from(value))
    }
}

/// A query and its parameters, ready to be framed.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    query: String,
    params: Vec<u8>,
    param_count: usize,
}

impl Query {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Vec::new(),
            param_count: 0,
        }
    }

    pub fn push_param(&mut self, param: impl Into<Param>) -> &mut Self {
        self.param_count += param.into().encode_into(&mut self.params);
        self
    }

    pub fn with_param(mut self, param: impl Into<Param>) -> Self {
        self.push_param(param);
        self
    }

    pub fn query_str(&self) -> &str {
        &self.query
    }

    /// Number of wire elements contributed by the parameters.
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Byte length of the query text.
    pub fn window(&self) -> usize {
        self.query.len()
    }

    /// Query text followed by the encoded parameters.
    pub fn dataframe(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.query.len() + self.params.len());
        buf.extend_from_slice(self.query.as_bytes());
        buf.extend_from_slice(&self.params);
        buf
    }

    fn metaframe(&self) -> String {
        let window = self.window().to_string();
        let total = window.len() + 1 + self.query.len() + self.params.len();
        format!("S{total}\n{window}\n")
    }

    /// The complete frame: metaframe followed by dataframe.
    pub fn encode_frame(&self) -> Vec<u8> {
        let metaframe = self.metaframe();
        let mut buf =
            Vec::with_capacity(metaframe.len() + self.query.len() + self.params.len());
        buf.extend_from_slice(metaframe.as_bytes());
        buf.extend_from_slice(self.query.as_bytes());
        buf.extend_from_slice(&self.params);
        buf
    }

    pub fn write_frame<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.metaframe().as_bytes())?;
        writer.write_all(self.query.as_bytes())?;
        writer.write_all(&self.params)?;
        Ok(())
    }
}

/// Builds a [`Query`](crate::protocol::Query) from query text and parameters.
#[macro_export]
macro_rules! query {
    ($query:expr $(, $param:expr)* $(,)?) => {{
        #[allow(unused_mut)]
        let mut q = $crate::protocol::Query::new($query);
        $(
            q.push_param($param);
        )*
        q
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_null() {
        assert_eq!(Param::Null.encode(), (b"\x00".to_vec(), 1));
        assert_eq!(Param::from(None::<&str>).encode(), (b"\x00".to_vec(), 1));
    }

    #[test]
    fn encode_bool() {
        assert_eq!(Param::from(false).encode(), (b"\x010".to_vec(), 1));
        assert_eq!(Param::from(true).encode(), (b"\x011".to_vec(), 1));
    }

    #[test]
    fn encode_uint() {
        assert_eq!(
            Param::from(UInt::new(1234)).encode(),
            (b"\x021234\n".to_vec(), 1)
        );
        assert_eq!(
            Param::from(UInt::new(u64::MAX)).encode(),
            (b"\x0218446744073709551615\n".to_vec(), 1)
        );
    }

    #[test]
    fn encode_sint() {
        assert_eq!(
            Param::from(SInt::new(-1234)).encode(),
            (b"\x03-1234\n".to_vec(), 1)
        );
        assert_eq!(Param::from(SInt::from(7)).encode(), (b"\x037\n".to_vec(), 1));
    }

    #[test]
    fn encode_float() {
        assert_eq!(
            Param::try_from(3.141592654_f64).unwrap().encode(),
            (b"\x043.141592654\n".to_vec(), 1)
        );
        assert_eq!(
            Param::try_from(-0.5_f64).unwrap().encode(),
            (b"\x04-0.5\n".to_vec(), 1)
        );
    }

    #[test]
    fn encode_binary() {
        assert_eq!(
            Param::from(&b"binary"[..]).encode(),
            (b"\x056\nbinary".to_vec(), 1)
        );
        assert_eq!(Param::from(Vec::<u8>::new()).encode(), (b"\x050\n".to_vec(), 1));
    }

    #[test]
    fn encode_text() {
        assert_eq!(Param::from("string").encode(), (b"\x066\nstring".to_vec(), 1));
        // length is in bytes, not characters
        assert_eq!(
            Param::from("é").encode(),
            ("\x062\né".as_bytes().to_vec(), 1)
        );
        assert_eq!(
            Param::from(Some(String::from("x"))).encode(),
            (b"\x061\nx".to_vec(), 1)
        );
    }

    #[test]
    fn negative_uint_is_rejected() {
        assert_eq!(
            UInt::try_from(-1i64),
            Err(ValidationError::NegativeUnsigned(-1))
        );
        assert_eq!(
            UInt::try_from(-20i32),
            Err(ValidationError::NegativeUnsigned(-20))
        );
        assert_eq!(UInt::try_from(20i64), Ok(UInt::new(20)));
    }

    #[test]
    fn non_finite_float_is_rejected() {
        assert!(matches!(
            Param::try_from(f64::NAN),
            Err(ValidationError::Unsupported(_))
        ));
        assert!(matches!(
            Param::float(f64::INFINITY),
            Err(ValidationError::Unsupported(_))
        ));
        assert!(Param::try_from(f32::NEG_INFINITY).is_err());
    }

    #[test]
    fn param_count() {
        assert_eq!(Query::new("sysctl report status").param_count(), 0);
        let q = Query::new("select ?, ?").with_param(true).with_param(Param::Null);
        assert_eq!(q.param_count(), 2);
    }

    #[test]
    fn encode_few_params() {
        let q = crate::query!(
            "insert into db.db { name: ?, random_num: ? }",
            "sayan",
            UInt::new(300)
        );
        assert_eq!(
            q.dataframe(),
            b"insert into db.db { name: ?, random_num: ? }\x065\nsayan\x02300\n".to_vec()
        );
        assert_eq!(q.query_str(), "insert into db.db { name: ?, random_num: ? }");
    }

    #[test]
    fn frame_without_params() {
        let q = Query::new("sysctl report status");
        assert_eq!(q.window(), 20);
        assert_eq!(q.encode_frame(), b"S23\n20\nsysctl report status".to_vec());
    }

    #[test]
    fn frame_with_params() {
        let mut q = Query::new("a ?");
        q.push_param(UInt::new(5));
        assert_eq!(q.encode_frame(), b"S8\n3\na ?\x025\n".to_vec());

        let mut written = Vec::new();
        q.write_frame(&mut written).unwrap();
        assert_eq!(written, q.encode_frame());
    }

    #[test]
    fn window_is_byte_length() {
        let q = Query::new("é");
        assert_eq!(q.window(), 2);
        assert_eq!(q.encode_frame(), "S4\n2\né".as_bytes().to_vec());
    }
}
