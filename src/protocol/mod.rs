//! Skyhash 2 client protocol.
//!
//! This module implements the client side of the Skyhash wire protocol: the
//! decoding of server responses, the encoding of queries, and the handshake
//! exchanged when a connection is opened. Everything here is a pure in-memory
//! transformation; reading and writing the socket is left to
//! [`Connection`](crate::connection::Connection).
//!
//! # Overview
//!
//! - [`Handshake`]: builds the authentication packet and interprets the
//!   server's four byte reply.
//! - [`Query`] and [`Param`]: a query string plus typed parameters, framed as
//!   `S<size>\n<window>\n<query><params>`.
//! - [`Decoder`]: resumable parser that turns bytes read from the server into
//!   a [`Response`], one response per call, as soon as enough bytes are
//!   buffered.
//!
//! # Binary Format
//!
//! Every server element starts with a one byte type tag. Numbers and lengths
//! are ASCII decimal terminated by `\n`; blobs and strings follow their length
//! as raw bytes; error codes are two little-endian bytes. Client parameters use
//! a separate, smaller tag table (see [`encoder::tag`] and [`decoder::tag`]);
//! the two directions are not symmetric.
//!
//! # Example
//! ```rust
//! use skyhash::protocol::{Decoder, Response, Row, Value};
//!
//! let mut decoder = Decoder::new();
//! decoder.append(b"\x132\n1\n\x0D5\nsayan1\n");
//! assert_eq!(decoder.try_parse_response().unwrap(), None);
//!
//! decoder.append(b"\x0D6\nsophie");
//! let rows = decoder.try_parse_response().unwrap().unwrap();
//! assert_eq!(
//!     rows,
//!     Response::Rows(vec![
//!         Row::new(vec![Value::from("sayan")]),
//!         Row::new(vec![Value::from("sophie")]),
//!     ])
//! );
//! ```
mod cursor;
pub mod decoder;
pub mod encoder;
mod error;
mod handshake;
mod value;

pub use decoder::Decoder;
pub use encoder::{Param, Query, SInt, UInt};
pub use error::{ClientError, ProtocolError, ValidationError};
pub use handshake::{Handshake, REPLY_SIZE};
pub use value::{ErrorCode, Response, Row, Value};
