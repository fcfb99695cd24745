//! Connection handshake.
//!
//! The client opens every connection with a single handshake packet and the
//! server answers with exactly four bytes:
//!
//! - `H 0 0 0`: accepted.
//! - `H 0 1 <code>`: rejected with a server error code.
//!
//! Anything else means the server speaks an incompatible protocol version.
use super::error::{ClientError, ProtocolError};

/// Size of the server's reply.
pub const REPLY_SIZE: usize = 4;

const ACCEPTED: [u8; REPLY_SIZE] = *b"H\0\0\0";

/// One-shot handshake negotiator. [`Handshake::finish`] consumes it.
#[derive(Debug, Clone)]
pub struct Handshake {
    request: Vec<u8>,
}

impl Handshake {
    /// `H`, five zeroed version bytes, then
    /// `<username len>\n<password len>\n<username><password>`.
    pub fn new(username: &str, password: &str) -> Self {
        let mut request = Vec::with_capacity(16 + username.len() + password.len());
        request.push(b'H');
        request.extend_from_slice(&[0; 5]);
        request.extend_from_slice(username.len().to_string().as_bytes());
        request.push(b'\n');
        request.extend_from_slice(password.len().to_string().as_bytes());
        request.push(b'\n');
        request.extend_from_slice(username.as_bytes());
        request.extend_from_slice(password.as_bytes());
        Self { request }
    }

    pub fn request(&self) -> &[u8] {
        &self.request
    }

    /// Interprets the server's reply.
    pub fn finish(self, reply: [u8; REPLY_SIZE]) -> Result<(), ClientError> {
        match reply {
            ACCEPTED => Ok(()),
            [b'H', 0, 1, code] => Err(ClientError::Handshake { code }),
            other => Err(ProtocolError::UnknownHandshake(other).into()),
        }
    }
}
