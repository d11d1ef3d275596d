//! Error types for the IRC protocol library.
//!
//! Malformed lines are never fatal: the codec drops them and moves on.
//! [`MessageParseError`] exists so callers parsing a single line by hand can
//! see why it was rejected.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a single line could not be turned into a [`crate::WireMessage`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line starts with `@` but no space ends the tag segment.
    #[error("tag segment is not terminated by a space")]
    UnterminatedTags,

    /// The prefix segment (`:origin`) is not followed by a space.
    #[error("prefix segment is not terminated by a space")]
    UnterminatedPrefix,

    /// Nothing is left after the optional tag and prefix segments.
    #[error("line has no command")]
    MissingCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        let err: ProtocolError = io_err.into();
        assert_eq!(err.to_string(), "io error: broken pipe");
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(MessageParseError::MissingCommand.to_string(), "line has no command");
        assert_eq!(
            MessageParseError::UnterminatedPrefix.to_string(),
            "prefix segment is not terminated by a space"
        );
    }
}
