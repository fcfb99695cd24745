//! Blocking connection to a Skyhash server.
//!
//! [`Connection`] drives the protocol over any bidirectional byte stream
//! (`TcpStream` in practice, in-memory streams in tests). It performs the
//! handshake when it is created, then runs one query at a time: write the
//! frame, read until the [`Decoder`] yields a complete response.
//!
//! A stream that closes while a response is pending is reported as
//! [`ClientError::TransportReset`]. Any error while reading discards the
//! partially received response; nothing is retried.
use std::io::{ErrorKind, Read, Write};

use log::{debug, info, trace, warn};

use crate::protocol::{ClientError, Decoder, Handshake, Query, REPLY_SIZE, Response};

const READ_CHUNK: usize = 1024;

pub struct Connection<T: Read + Write> {
    stream: T,
    decoder: Decoder,
}

impl<T: Read + Write> Connection<T> {
    /// Authenticates over `stream` and returns a connection ready for queries.
    pub fn handshake(mut stream: T, username: &str, password: &str) -> Result<Self, ClientError> {
        let hs = Handshake::new(username, password);
        stream.write_all(hs.request())?;
        stream.flush()?;

        let mut reply = [0; REPLY_SIZE];
        read_exact(&mut stream, &mut reply)?;
        if let Err(e) = hs.finish(reply) {
            warn!("handshake failed for user '{username}': {e}");
            return Err(e);
        }
        info!("handshake accepted for user '{username}'");

        Ok(Self {
            stream,
            decoder: Decoder::new(),
        })
    }

    /// Sends `query` and waits for its response.
    pub fn query(&mut self, query: &Query) -> Result<Response, ClientError> {
        let frame = query.encode_frame();
        debug!(
            "sending query ({} bytes, {} params)",
            frame.len(),
            query.param_count()
        );
        self.stream.write_all(&frame)?;
        self.stream.flush()?;

        match self.read_response() {
            Ok(resp) => Ok(resp),
            Err(e) => {
                warn!("discarding partial response: {e}");
                self.decoder.clear();
                Err(e)
            }
        }
    }

    fn read_response(&mut self) -> Result<Response, ClientError> {
        let mut chunk = [0; READ_CHUNK];
        loop {
            let n = match self.stream.read(&mut chunk) {
                Ok(0) => return Err(ClientError::TransportReset),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            trace!("read {n} bytes");
            self.decoder.append(&chunk[..n]);

            if let Some(resp) = self.decoder.try_parse_response()? {
                self.decoder.compact();
                debug!("received complete response");
                return Ok(resp);
            }
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.stream
    }

    pub fn into_inner(self) -> T {
        self.stream
    }

    /// Flushes and drops the stream.
    pub fn close(mut self) -> Result<(), ClientError> {
        self.stream.flush()?;
        debug!("connection closed");
        Ok(())
    }
}

fn read_exact<T: Read>(stream: &mut T, buf: &mut [u8]) -> Result<(), ClientError> {
    stream.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => ClientError::TransportReset,
        _ => e.into(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use crate::protocol::{ErrorCode, ProtocolError, Row, UInt, Value};

    use super::*;

    /// In-memory stream that hands out at most `chunk` bytes per read.
    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        chunk: usize,
    }

    impl MockStream {
        fn new(input: &[u8], chunk: usize) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
                chunk,
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.chunk);
            self.input.read(&mut buf[..n])
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn server_reply(parts: &[&[u8]]) -> Vec<u8> {
        let mut reply = b"H\0\0\0".to_vec();
        for part in parts {
            reply.extend_from_slice(part);
        }
        reply
    }

    #[test]
    fn handshake_then_query() {
        let input = server_reply(&[b"\x132\n1\n\x0D5\nsayan1\n\x0D6\nsophie"]);
        let stream = MockStream::new(&input, 3);
        let mut con = Connection::handshake(stream, "root", "pass").unwrap();

        let q = Query::new("select name from db.db").with_param(UInt::new(1));
        let resp = con.query(&q).unwrap();
        assert_eq!(
            resp,
            Response::Rows(vec![
                Row::new(vec![Value::from("sayan")]),
                Row::new(vec![Value::from("sophie")]),
            ])
        );

        let mut expected = Handshake::new("root", "pass").request().to_vec();
        expected.extend_from_slice(&q.encode_frame());
        assert_eq!(con.into_inner().output, expected);
    }

    #[test]
    fn sequential_queries() {
        let input = server_reply(&[b"\x12", b"\x10\x02\x00", b"\x05", b"42\n"]);
        let mut con = Connection::handshake(MockStream::new(&input, 1), "root", "pass").unwrap();

        assert_eq!(con.query(&Query::new("use space")).unwrap(), Response::Empty);
        assert_eq!(
            con.query(&Query::new("drop space")).unwrap(),
            Response::Error(ErrorCode(2))
        );
        let resp = con.query(&Query::new("select count")).unwrap();
        assert!(matches!(resp.value(), Some(Value::UInt64(42))));
        assert!(con.close().is_ok());
    }

    #[test]
    fn handshake_rejected() {
        let stream = MockStream::new(b"H\x00\x01\x05", 64);
        let err = Connection::handshake(stream, "root", "wrong").err().unwrap();
        assert!(matches!(err, ClientError::Handshake { code: 5 }));
    }

    #[test]
    fn handshake_unknown_reply() {
        let stream = MockStream::new(b"H\x01\x00\x00", 64);
        let err = Connection::handshake(stream, "root", "pass").err().unwrap();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::UnknownHandshake(_))
        ));
    }

    #[test]
    fn handshake_short_reply() {
        let stream = MockStream::new(b"H\x00", 64);
        let err = Connection::handshake(stream, "root", "pass").err().unwrap();
        assert!(matches!(err, ClientError::TransportReset));
    }

    #[test]
    fn stream_closed_mid_response() {
        let input = server_reply(&[b"\x0D11\nhello"]);
        let mut con = Connection::handshake(MockStream::new(&input, 4), "root", "pass").unwrap();

        let err = con.query(&Query::new("select")).unwrap_err();
        assert!(matches!(err, ClientError::TransportReset));
        assert_eq!(con.decoder.buffered(), 0);
    }

    #[test]
    fn malformed_response() {
        let input = server_reply(&[b"\x0F0\n"]);
        let mut con = Connection::handshake(MockStream::new(&input, 64), "root", "pass").unwrap();

        let err = con.query(&Query::new("select")).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::DictionaryUnsupported)
        ));
        assert_eq!(con.decoder.buffered(), 0);
    }
}
