//! Byte cursor used by the decoder.
//!
//! A [`Cursor`] borrows the decoder's buffer and owns a position into it. All
//! movement goes through [`Cursor::next_byte`], [`Cursor::take`] and
//! [`Cursor::rewind_to`], and [`Cursor::attempt`] wraps a parse step so that a
//! step which does not finish leaves the position where it started.
use super::error::ProtocolError;

/// Reason a parse step stopped before producing a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Interrupt {
    /// The buffer ends before the element does.
    Incomplete,
    Protocol(ProtocolError),
}

impl From<ProtocolError> for Interrupt {
    fn from(value: ProtocolError) -> Self {
        Interrupt::Protocol(value)
    }
}

pub(crate) type Step<T> = Result<T, Interrupt>;

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    pub fn next_byte(&mut self) -> Step<u8> {
        let byte = self.peek().ok_or(Interrupt::Incomplete)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Returns the next `n` bytes and moves past them.
    pub fn take(&mut self, n: usize) -> Step<&'a [u8]> {
        if self.remaining() < n {
            return Err(Interrupt::Incomplete);
        }
        let buf = self.buf;
        let start = self.pos;
        self.pos += n;
        Ok(&buf[start..self.pos])
    }

    /// Bytes between `start` and the current position.
    pub fn since(&self, start: usize) -> &'a [u8] {
        let buf = self.buf;
        &buf[start..self.pos]
    }

    pub fn rewind_to(&mut self, pos: usize) {
        debug_assert!(pos <= self.buf.len());
        self.pos = pos;
    }

    /// Runs `f`, restoring the starting position if it does not produce a value.
    pub fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Step<T>) -> Step<T> {
        let start = self.pos;
        let res = f(self);
        if res.is_err() {
            self.rewind_to(start);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_byte_and_take() {
        let mut cursor = Cursor::new(b"abcdef", 1);
        assert_eq!(cursor.peek(), Some(b'b'));
        assert_eq!(cursor.next_byte(), Ok(b'b'));
        assert_eq!(cursor.take(3), Ok(&b"cde"[..]));
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.take(2), Err(Interrupt::Incomplete));
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn end_of_buffer() {
        let mut cursor = Cursor::new(b"a", 0);
        cursor.next_byte().unwrap();
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.next_byte(), Err(Interrupt::Incomplete));
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn since_returns_consumed_bytes() {
        let mut cursor = Cursor::new(b"12\n", 0);
        cursor.take(3).unwrap();
        assert_eq!(cursor.since(0), b"12\n");
        assert_eq!(cursor.since(3), b"");
    }

    #[test]
    fn attempt_restores_on_interrupt() {
        let mut cursor = Cursor::new(b"abc", 0);
        let res: Step<()> = cursor.attempt(|c| {
            c.take(2)?;
            c.take(5)?;
            Ok(())
        });
        assert_eq!(res, Err(Interrupt::Incomplete));
        assert_eq!(cursor.position(), 0);

        let res: Step<u8> = cursor.attempt(|c| {
            c.next_byte()?;
            Err(ProtocolError::InvalidInteger.into())
        });
        assert_eq!(res, Err(Interrupt::Protocol(ProtocolError::InvalidInteger)));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn attempt_commits_on_success() {
        let mut cursor = Cursor::new(b"abc", 0);
        let res = cursor.attempt(|c| c.take(2));
        assert_eq!(res, Ok(&b"ab"[..]));
        assert_eq!(cursor.position(), 2);
    }
}
