//! `nick!user@host` origin splitting.

/// Borrowed view of a message origin.
///
/// Server origins have no `!`, so only `nick` is populated (with the server
/// name).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hostmask<'a> {
    /// Text before the `!`.
    pub nick: &'a str,
    /// Text between `!` and `@`, empty when absent.
    pub username: &'a str,
    /// Text after `@`, if present.
    pub hostname: Option<&'a str>,
    /// The whole origin string.
    pub raw: &'a str,
}

impl<'a> Hostmask<'a> {
    /// Split an origin string.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        let (nick, rest) = raw.split_once('!').unwrap_or((raw, ""));
        let (username, hostname) = match rest.split_once('@') {
            Some((username, hostname)) => (username, Some(hostname)),
            None => (rest, None),
        };
        Self {
            nick,
            username,
            hostname,
            raw,
        }
    }

    /// Nickname part of a hostmask given as a plain string.
    #[must_use]
    pub fn nick_of(raw: &'a str) -> &'a str {
        Self::parse(raw).nick
    }
}
