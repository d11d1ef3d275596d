//! IRC message codec for tokio.
//!
//! Decodes CRLF-delimited lines into [`WireMessage`] values and encodes
//! outbound lines with the delimiter appended. Lines that fail to parse are
//! dropped here and never reach the caller.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::LineCodec;
use crate::message::WireMessage;

/// Tokio codec for decoding IRC messages and encoding raw lines.
///
/// Wraps [`LineCodec`] and parses lines into [`WireMessage`] values.
#[derive(Clone, Debug, Default)]
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a new codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncate outgoing data at its first line ending.
    ///
    /// A caller-supplied line can never smuggle a second command.
    #[must_use]
    pub fn sanitize(mut data: String) -> String {
        if let Some(pos) = data.find(['\r', '\n']) {
            data.truncate(pos);
        }
        data
    }

    /// Parse one delimiter-stripped frame, tracing and dropping it if malformed.
    pub fn parse_line(line: &[u8]) -> Option<WireMessage> {
        let text = String::from_utf8_lossy(line);
        match text.parse::<WireMessage>() {
            Ok(msg) => Some(msg),
            Err(err) => {
                tracing::trace!(line = %text, error = %err, "dropping malformed line");
                None
            }
        }
    }
}

impl Decoder for IrcCodec {
    type Item = WireMessage;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<WireMessage>> {
        while let Some(line) = self.inner.decode_line(src) {
            if let Some(msg) = Self::parse_line(&line) {
                return Ok(Some(msg));
            }
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<WireMessage>> {
        if let Some(msg) = self.decode(src)? {
            return Ok(Some(msg));
        }
        self.inner.decode_eof(src).map(|_| None)
    }
}

impl Encoder<String> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        let sanitized = Self::sanitize(line);
        self.inner.encode_line(&sanitized, dst);
        Ok(())
    }
}
