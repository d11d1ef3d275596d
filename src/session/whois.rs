//! WHOIS reply aggregation.
//!
//! Replies arrive one field group at a time and are collected per target
//! (keyed by lowercased nickname) until RPL_ENDOFWHOIS.

use std::collections::HashMap;

use serde::Serialize;

/// The finished result of one WHOIS sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WhoisRecord {
    pub nickname: String,
    pub username: String,
    pub hostname: String,
    pub realname: String,
    pub channels: Vec<String>,
    pub server: Option<String>,
    pub away: Option<String>,
    pub oper: bool,
    /// Seconds idle, as reported.
    pub idle: Option<String>,
    /// Sign-on time, as reported.
    pub sign: Option<String>,
}

impl WhoisRecord {
    fn new(nickname: &str) -> Self {
        Self {
            nickname: nickname.to_string(),
            ..Self::default()
        }
    }
}

/// In-flight WHOIS records.
#[derive(Debug, Default)]
pub struct WhoisBook {
    pending: HashMap<String, WhoisRecord>,
}

impl WhoisBook {
    fn entry(&mut self, nick: &str) -> &mut WhoisRecord {
        self.pending
            .entry(nick.to_lowercase())
            .or_insert_with(|| WhoisRecord::new(nick))
    }

    /// RPL_WHOISUSER. Restarts the channel list and oper flag.
    pub fn user(&mut self, nick: &str, username: &str, hostname: &str, realname: &str) {
        let record = self.entry(nick);
        record.nickname = nick.to_string();
        record.username = username.to_string();
        record.hostname = hostname.to_string();
        record.realname = realname.to_string();
        record.channels.clear();
        record.oper = false;
    }

    pub fn channels(&mut self, nick: &str, channels: &str) {
        self.entry(nick)
            .channels
            .extend(channels.split(' ').filter(|c| !c.is_empty()).map(str::to_string));
    }

    pub fn server(&mut self, nick: &str, server: &str) {
        self.entry(nick).server = Some(server.to_string());
    }

    pub fn oper(&mut self, nick: &str) {
        self.entry(nick).oper = true;
    }

    pub fn idle(&mut self, nick: &str, idle: &str, sign: &str) {
        let record = self.entry(nick);
        record.idle = Some(idle.to_string());
        record.sign = Some(sign.to_string());
    }

    /// RPL_AWAY. Also sent when messaging an away user, so it only
    /// annotates a WHOIS already in progress.
    pub fn away(&mut self, nick: &str, message: &str) -> bool {
        match self.pending.get_mut(&nick.to_lowercase()) {
            Some(record) => {
                record.away = Some(message.to_string());
                true
            }
            None => false,
        }
    }

    /// RPL_ENDOFWHOIS. `None` when nothing was collected for `nick`.
    pub fn finish(&mut self, nick: &str) -> Option<WhoisRecord> {
        self.pending.remove(&nick.to_lowercase())
    }

    pub fn is_pending(&self, nick: &str) -> bool {
        self.pending.contains_key(&nick.to_lowercase())
    }
}
