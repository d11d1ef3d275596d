//! Sans-IO stream framer.
//!
//! [`LineFramer`] owns the carry-over buffer that [`LineCodec`] scans, so a
//! caller holding raw socket chunks can recover lines without a tokio codec.
//!
//! ```
//! use slirc_proto::LineFramer;
//!
//! let mut framer = LineFramer::new();
//! assert_eq!(framer.push(b"PING :a\r").count(), 0);
//!
//! let lines: Vec<_> = framer.push(b"\nPING :b\r\n").collect();
//! assert_eq!(lines, vec![&b"PING :a"[..], &b"PING :b"[..]]);
//! ```

use bytes::{Bytes, BytesMut};

use crate::line::LineCodec;

/// Recovers complete lines from arbitrarily chunked input.
#[derive(Debug, Default)]
pub struct LineFramer {
    codec: LineCodec,
    buf: BytesMut,
}

impl LineFramer {
    /// Create an empty framer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return an iterator over the lines it completes.
    ///
    /// The iterator is lazy. Lines not pulled before it is dropped stay
    /// buffered and are yielded by the next call to [`push`](Self::push) or
    /// [`next_line`](Self::next_line).
    pub fn push(&mut self, chunk: &[u8]) -> Lines<'_> {
        self.buf.extend_from_slice(chunk);
        Lines { framer: self }
    }

    /// Take the next complete line, if one is buffered.
    pub fn next_line(&mut self) -> Option<Bytes> {
        self.codec.decode_line(&mut self.buf)
    }

    /// Bytes received but not yet terminated by a delimiter.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Drop any buffered bytes.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.codec.reset();
    }
}

/// Iterator returned by [`LineFramer::push`].
#[derive(Debug)]
pub struct Lines<'a> {
    framer: &'a mut LineFramer,
}

impl Iterator for Lines<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        self.framer.next_line()
    }
}
