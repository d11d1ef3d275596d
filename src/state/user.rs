//! Roster member types.

use serde::{Deserialize, Serialize};

/// Channel privilege prefixes, highest rank first.
pub const PREFIX_RANKS: &str = "~&@%+";

/// A channel or query member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display nickname, original case.
    pub nickname: String,
    pub username: String,
    /// Host part of the hostmask.
    pub address: String,
    pub realname: String,
    /// Channel-scoped privilege prefixes, e.g. `"@"` or `"@+"`.
    pub mode: String,
    /// Palette token, assigned once on first sight.
    pub color: String,
}

impl User {
    pub(crate) fn new(info: UserInfo, color: String) -> Self {
        Self {
            nickname: info.nickname,
            username: info.username.unwrap_or_default(),
            address: info.address.unwrap_or_default(),
            realname: info.realname.unwrap_or_default(),
            mode: info.mode.unwrap_or_default(),
            color,
        }
    }

    /// Overwrite the fields `info` carries. Nickname and color never change here.
    pub(crate) fn merge(&mut self, info: UserInfo) {
        if let Some(username) = info.username {
            self.username = username;
        }
        if let Some(address) = info.address {
            self.address = address;
        }
        if let Some(realname) = info.realname {
            self.realname = realname;
        }
        if let Some(mode) = info.mode {
            self.mode = mode;
        }
    }

    /// Rank of the highest prefix held; lower is more privileged.
    #[must_use]
    pub fn rank(&self) -> usize {
        prefix_rank(&self.mode)
    }

    /// Grant a prefix if not already held.
    pub fn add_prefix(&mut self, prefix: char) {
        if !self.mode.contains(prefix) {
            self.mode.push(prefix);
            let mut chars: Vec<char> = self.mode.chars().collect();
            chars.sort_by_key(|c| PREFIX_RANKS.find(*c).unwrap_or(PREFIX_RANKS.len()));
            self.mode = chars.into_iter().collect();
        }
    }

    /// Revoke a prefix.
    pub fn remove_prefix(&mut self, prefix: char) {
        self.mode.retain(|c| c != prefix);
    }
}

/// Rank of the most privileged prefix in `mode`; `PREFIX_RANKS.len()` when none.
#[must_use]
pub fn prefix_rank(mode: &str) -> usize {
    mode.chars()
        .filter_map(|c| PREFIX_RANKS.find(c))
        .min()
        .unwrap_or(PREFIX_RANKS.len())
}

/// Split a NAMES entry such as `"@+alice"` into `("@+", "alice")`.
#[must_use]
pub fn split_prefixes(entry: &str) -> (&str, &str) {
    let nick = entry.trim_start_matches(|c: char| PREFIX_RANKS.contains(c));
    (&entry[..entry.len() - nick.len()], nick)
}

/// Fields known about a user at one point in time.
///
/// `None` leaves the stored value untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub nickname: String,
    pub username: Option<String>,
    pub address: Option<String>,
    pub realname: Option<String>,
    pub mode: Option<String>,
}

impl UserInfo {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = Some(realname.into());
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}
