//! Code conversions for [`Response`].

use std::str::FromStr;

use thiserror::Error;

use super::Response;

impl Response {
    /// The numeric code.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether the name carries the `ERR_` prefix.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.name().starts_with("ERR_")
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s.parse().map_err(|_| ParseResponseError::InvalidFormat)?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// A command token that is not a known numeric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseResponseError {
    /// Not a number.
    #[error("invalid response code format")]
    InvalidFormat,
    /// A number with no table entry.
    #[error("unknown response code: {0}")]
    UnknownCode(u16),
}
