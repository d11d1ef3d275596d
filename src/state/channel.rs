//! Channel and query state.
//!
//! A [`Channel`] models both a joinable channel and a two-party query; the
//! [`ChannelKind`] discriminator tells them apart. The roster is keyed by
//! lowercased nickname and the names view is rebuilt after every roster
//! change.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use super::palette::Palette;
use super::user::{User, UserInfo};

/// Discriminator between channels and private conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Channel,
    Private,
}

/// One row of the sorted names view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameEntry {
    pub name: String,
    pub mode: String,
}

/// Exported channel state, also accepted when restoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChannelKind>,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChannelSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            topic: String::new(),
            messages: Vec::new(),
        }
    }
}

/// A channel or query.
#[derive(Debug, Clone)]
pub struct Channel {
    name: String,
    kind: ChannelKind,
    topic: String,
    topic_set_by: String,
    topic_set_at: String,
    mode: String,
    joined: bool,
    unread: usize,
    /// The session's nickname as last seen by this channel.
    nick: String,
    /// Peer nickname for queries.
    peer: String,
    messages: VecDeque<ChatMessage>,
    limit: usize,
    users: HashMap<String, User>,
    names: Vec<NameEntry>,
}

impl Channel {
    pub fn new(name: impl Into<String>, kind: ChannelKind, nick: impl Into<String>, limit: usize) -> Self {
        let name = name.into();
        let peer = match kind {
            ChannelKind::Private => name.clone(),
            ChannelKind::Channel => String::new(),
        };
        Self {
            name,
            kind,
            topic: String::new(),
            topic_set_by: String::new(),
            topic_set_at: String::new(),
            mode: String::new(),
            joined: false,
            unread: 0,
            nick: nick.into(),
            peer,
            messages: VecDeque::new(),
            limit,
            users: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// Seed the topic without logging it.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Rebuild a channel from an exported snapshot.
    pub fn restore(snapshot: ChannelSnapshot, kind: ChannelKind, nick: impl Into<String>, limit: usize) -> Self {
        let mut chan = Self::new(snapshot.name, kind, nick, limit);
        chan.topic = snapshot.topic;
        for msg in snapshot.messages {
            chan.push_message(msg);
        }
        chan
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            name: self.name.clone(),
            kind: Some(self.kind),
            topic: self.topic.clone(),
            messages: self.messages.iter().cloned().collect(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased lookup key.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn topic_set_by(&self) -> &str {
        &self.topic_set_by
    }

    pub fn topic_set_at(&self) -> &str {
        &self.topic_set_at
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Whether the join was confirmed. Queries are never joined.
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn messages(&self) -> impl ExactSizeIterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn message_limit(&self) -> usize {
        self.limit
    }

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(&nick.to_lowercase())
    }

    pub fn has_user(&self, nick: &str) -> bool {
        self.users.contains_key(&nick.to_lowercase())
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Members sorted by privilege rank, then nickname.
    pub fn names(&self) -> &[NameEntry] {
        &self.names
    }

    // ========================================================================
    // Log
    // ========================================================================

    /// Append to the log, evicting the oldest entries beyond the limit.
    pub fn push_message(&mut self, mut msg: ChatMessage) {
        if self.limit == 0 {
            return;
        }
        while self.messages.len() >= self.limit {
            self.messages.pop_front();
        }
        msg.channel = Some(self.name.clone());
        self.messages.push_back(msg);
    }

    /// Fold another conversation's log into this one, ordered by timestamp.
    pub(crate) fn absorb_log(&mut self, other: Channel) {
        self.unread += other.unread;
        let mut merged: Vec<ChatMessage> = self.messages.drain(..).chain(other.messages).collect();
        merged.sort_by_key(|msg| msg.ts);
        for msg in merged {
            self.push_message(msg);
        }
    }

    pub(crate) fn bump_unread(&mut self) {
        self.unread += 1;
    }

    /// Reset the unread counter.
    pub fn mark_read(&mut self) {
        self.unread = 0;
    }

    // ========================================================================
    // Topic / mode
    // ========================================================================

    /// Store a new topic. Returns the info line to log when it changed.
    pub fn set_topic(&mut self, topic: &str, who: Option<&str>) -> Option<String> {
        if topic == self.topic {
            return None;
        }
        self.topic = topic.to_string();
        Some(match who {
            Some(who) => format!("{who} changed the topic to {topic}"),
            None => format!("Topic: {topic}"),
        })
    }

    /// Record who set the topic and when.
    pub fn set_topic_changed(&mut self, by: &str, at: &str) -> Option<String> {
        if by == self.topic_set_by && at == self.topic_set_at {
            return None;
        }
        self.topic_set_by = by.to_string();
        self.topic_set_at = at.to_string();
        Some(format!("Set by {by} on {at}"))
    }

    /// Replace the mode string. Returns the info line to log when it changed.
    pub fn set_mode(&mut self, mode: &str) -> Option<String> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode.to_string();
        Some(format!("Mode is {mode}"))
    }

    /// Apply a mode delta such as `+o-v alice bob`.
    ///
    /// Member prefixes update roster entries in place; other flags update the
    /// channel mode string. Returns true when the roster changed.
    pub fn apply_mode_delta(&mut self, delta: &str, args: &[String]) -> bool {
        let mut adding = true;
        let mut args = args.iter();
        let mut roster_changed = false;
        let mut flags: Vec<char> = self.mode.trim_start_matches('+').chars().collect();

        for c in delta.chars() {
            match c {
                '+' => adding = true,
                '-' => adding = false,
                _ => {
                    if let Some(prefix) = member_prefix(c) {
                        let Some(target) = args.next() else { continue };
                        if let Some(user) = self.users.get_mut(&target.to_lowercase()) {
                            if adding {
                                user.add_prefix(prefix);
                            } else {
                                user.remove_prefix(prefix);
                            }
                            roster_changed = true;
                        }
                        continue;
                    }
                    if takes_argument(c, adding) {
                        args.next();
                    }
                    if is_list_mode(c) {
                        continue;
                    }
                    if adding {
                        if !flags.contains(&c) {
                            flags.push(c);
                        }
                    } else {
                        flags.retain(|f| *f != c);
                    }
                }
            }
        }

        self.mode = if flags.is_empty() {
            String::new()
        } else {
            std::iter::once('+').chain(flags).collect()
        };
        if roster_changed {
            self.rebuild_names();
        }
        roster_changed
    }

    // ========================================================================
    // Own nickname / membership
    // ========================================================================

    /// Track the session's new nickname. Returns the info line to log.
    pub fn update_my_nick(&mut self, nick: &str) -> String {
        self.nick = nick.to_string();
        format!("You are now known as {nick}")
    }

    /// Confirm the join. Only the first call changes anything.
    pub fn mark_joined(&mut self) -> bool {
        if self.joined || self.kind == ChannelKind::Private {
            return false;
        }
        self.joined = true;
        true
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Insert a member if absent. An existing member is left untouched.
    pub fn add_user(&mut self, info: UserInfo, palette: &mut dyn Palette) -> bool {
        let key = info.nickname.to_lowercase();
        if self.users.contains_key(&key) {
            return false;
        }
        let user = User::new(info, palette.next_color());
        self.users.insert(key, user);
        self.rebuild_names();
        true
    }

    /// Insert a member or update the fields `info` carries.
    ///
    /// Returns true when the member was newly inserted. The color of an
    /// existing member is never reassigned.
    pub fn upsert_user(&mut self, info: UserInfo, palette: &mut dyn Palette) -> bool {
        let key = info.nickname.to_lowercase();
        let inserted = match self.users.get_mut(&key) {
            Some(user) => {
                user.merge(info);
                false
            }
            None => {
                let user = User::new(info, palette.next_color());
                self.users.insert(key, user);
                true
            }
        };
        self.rebuild_names();
        inserted
    }

    pub fn remove_user(&mut self, nick: &str) -> Option<User> {
        let removed = self.users.remove(&nick.to_lowercase());
        if removed.is_some() {
            self.rebuild_names();
        }
        removed
    }

    /// Move a member to a new nickname, keeping the same entity.
    ///
    /// If another member already holds `to`, that entry is kept and the
    /// renamed one is dropped.
    pub fn rename_user(&mut self, from: &str, to: &str) -> bool {
        let to_key = to.to_lowercase();
        let Some(mut user) = self.users.remove(&from.to_lowercase()) else {
            return false;
        };
        match self.users.get_mut(&to_key) {
            Some(existing) => existing.nickname = to.to_string(),
            None => {
                user.nickname = to.to_string();
                self.users.insert(to_key, user);
            }
        }
        self.rebuild_names();
        true
    }

    /// Rename a query along with its peer.
    pub(crate) fn rename_peer(&mut self, to: &str) {
        self.peer = to.to_string();
        if self.kind == ChannelKind::Private {
            self.name = to.to_string();
        }
    }

    fn rebuild_names(&mut self) {
        let mut names: Vec<(usize, String, NameEntry)> = self
            .users
            .values()
            .map(|u| {
                (
                    u.rank(),
                    u.nickname.to_lowercase(),
                    NameEntry {
                        name: u.nickname.clone(),
                        mode: u.mode.clone(),
                    },
                )
            })
            .collect();
        names.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        self.names = names.into_iter().map(|(_, _, entry)| entry).collect();
    }
}

/// Prefix granted by a member mode letter.
fn member_prefix(mode: char) -> Option<char> {
    match mode {
        'q' => Some('~'),
        'a' => Some('&'),
        'o' => Some('@'),
        'h' => Some('%'),
        'v' => Some('+'),
        _ => None,
    }
}

fn is_list_mode(mode: char) -> bool {
    matches!(mode, 'b' | 'e' | 'I')
}

fn takes_argument(mode: char, adding: bool) -> bool {
    match mode {
        'b' | 'e' | 'I' | 'k' => true,
        'l' => adding,
        _ => false,
    }
}
