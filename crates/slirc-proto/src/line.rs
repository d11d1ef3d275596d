//! CRLF line codec.
//!
//! Lines are delimited by the two-byte sequence `\r\n`. The codec keeps no
//! copy of the data: it remembers how far it has already scanned so that a
//! partial read is never rescanned from the start, and it backs up by one
//! byte so a delimiter split across two reads is still found.

use bytes::{Bytes, BytesMut};
#[cfg(feature = "tokio")]
use tokio_util::codec::{Decoder, Encoder};

#[cfg(feature = "tokio")]
use crate::error;

/// The protocol line delimiter.
pub const DELIMITER: &[u8; 2] = b"\r\n";

/// Line codec that splits a byte stream on `\r\n`.
///
/// Yielded lines have the delimiter stripped. Bytes that are not yet
/// terminated stay in the source buffer until more data arrives.
#[derive(Clone, Debug, Default)]
pub struct LineCodec {
    /// Index of the next byte to check for the delimiter.
    next_index: usize,
}

impl LineCodec {
    /// Create a new line codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split the next complete line off the front of `src`.
    ///
    /// Returns `None` when `src` holds no delimiter yet; the unterminated
    /// tail is left in place.
    pub fn decode_line(&mut self, src: &mut BytesMut) -> Option<Bytes> {
        let start = self.next_index.min(src.len());
        match find_delimiter(&src[start..]) {
            Some(offset) => {
                let end = start + offset;
                let mut line = src.split_to(end + DELIMITER.len());
                line.truncate(end);
                self.next_index = 0;
                Some(line.freeze())
            }
            None => {
                // A trailing '\r' may be the first half of the next delimiter.
                self.next_index = src.len().saturating_sub(1);
                None
            }
        }
    }

    /// Append `line` and the delimiter to `dst`.
    pub fn encode_line(&mut self, line: &str, dst: &mut BytesMut) {
        dst.reserve(line.len() + DELIMITER.len());
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(DELIMITER);
    }

    /// Forget the scan position, for use after the source buffer was reset.
    pub fn reset(&mut self) {
        self.next_index = 0;
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
}

#[cfg(feature = "tokio")]
impl Decoder for LineCodec {
    type Item = Bytes;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Bytes>> {
        Ok(self.decode_line(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<Bytes>> {
        if let Some(line) = self.decode_line(src) {
            return Ok(Some(line));
        }
        if !src.is_empty() {
            tracing::trace!(bytes = src.len(), "discarding unterminated tail at end of stream");
            src.clear();
            self.reset();
        }
        Ok(None)
    }
}

#[cfg(feature = "tokio")]
impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        self.encode_line(&line, dst);
        Ok(())
    }
}
