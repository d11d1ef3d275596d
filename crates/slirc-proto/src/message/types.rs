//! The parsed wire message.

use std::fmt;

use super::tags::{TagValue, Tags};
use crate::hostmask::Hostmask;

/// One parsed protocol line.
///
/// All fields are plain strings. `command` holds the token as received
/// until [`with_command`](Self::with_command) replaces a numeric code with
/// its symbolic name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WireMessage {
    /// Message tags from the optional `@` segment.
    pub tags: Tags,
    /// Origin from the optional `:` segment, empty when absent.
    pub prefix: String,
    /// Command token, numeric or symbolic.
    pub command: String,
    /// Middle parameters in order.
    pub params: Vec<String>,
    /// Final free-text parameter, empty when absent.
    pub trailing: String,
    /// The original line, for diagnostics.
    pub raw: String,
}

impl WireMessage {
    /// Parse a line, discarding it if it is structurally invalid.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        line.parse().ok()
    }

    /// Replace the command with its resolved name.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Split the prefix into its hostmask parts.
    #[must_use]
    pub fn hostmask(&self) -> Hostmask<'_> {
        Hostmask::parse(&self.prefix)
    }

    /// Nickname part of the prefix.
    #[must_use]
    pub fn source_nick(&self) -> &str {
        self.hostmask().nick
    }

    /// Middle parameter at `index`, or `""`.
    #[must_use]
    pub fn param(&self, index: usize) -> &str {
        self.params.get(index).map_or("", String::as_str)
    }

    /// The trailing text, or the last middle parameter when there is none.
    #[must_use]
    pub fn text(&self) -> &str {
        if self.trailing.is_empty() {
            self.params.last().map_or("", String::as_str)
        } else {
            &self.trailing
        }
    }

    /// Look up a tag by key.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    /// Whether the command is a three-digit numeric reply.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
