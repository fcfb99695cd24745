use std::io;

use thiserror::Error;

/// Malformed or unsupported data received from the server.
///
/// Always fatal to the operation that produced it; the buffer position that
/// raised it is never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid response from server")]
    InvalidInteger,

    #[error("received invalid data: boolean byte {0:#04x}")]
    InvalidBoolean(u8),

    #[error("received invalid data: malformed float '{0}'")]
    InvalidFloat(String),

    #[error("received invalid data: string is not valid utf-8")]
    InvalidUtf8,

    #[error("dictionaries are not supported yet")]
    DictionaryUnsupported,

    #[error("unknown type with code {0} sent by server")]
    UnknownType(u8),

    #[error("unexpected element with code {0} inside a collection")]
    UnexpectedElement(u8),

    #[error("nesting exceeds maximum depth of {0}")]
    NestingTooDeep(usize),

    #[error("unknown handshake {0:?}")]
    UnknownHandshake([u8; 4]),
}

/// Client-side rejection of a parameter before anything reaches the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsigned int can't be negative: {0}")]
    NegativeUnsigned(i64),

    #[error("unsupported type: {0}")]
    Unsupported(String),
}

/// Everything a connection can fail with.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("handshake error {code}")]
    Handshake { code: u8 },

    #[error("connection reset by server")]
    TransportReset,

    #[error("transport IO error: {0}")]
    Io(#[from] io::Error),
}
