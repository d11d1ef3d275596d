//! PRIVMSG and NOTICE.

use slirc_proto::WireMessage;
use tracing::debug;

use super::{Handler, is_me};
use crate::session::Session;
use crate::state::{ChannelKind, ChatMessage, MessageKind};

const ACTION_PREFIX: &str = "\u{1}ACTION";
const CTCP_DELIM: char = '\u{1}';

const NICKSERV: &str = "NickServ";

/// Split a CTCP ACTION payload from plain text.
fn classify(text: &str) -> (MessageKind, &str) {
    match text.strip_prefix(ACTION_PREFIX) {
        Some(rest) => {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            (MessageKind::Action, rest.strip_suffix(CTCP_DELIM).unwrap_or(rest))
        }
        None => (MessageKind::Message, text),
    }
}

/// Whether `text` should flag the user.
fn is_mention(text: &str, nick: &str, private: bool) -> bool {
    private || (!nick.is_empty() && text.to_lowercase().contains(&nick.to_lowercase()))
}

pub struct PrivmsgHandler;

impl Handler for PrivmsgHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let hostmask = msg.hostmask();
        let from = hostmask.nick;
        let to = msg.param(0);
        if from.is_empty() {
            debug!(to = %to, "PRIVMSG without an origin");
            return;
        }

        let (kind, name) = if let Some(chan) = session.channel(to) {
            (ChannelKind::Channel, chan.name().to_string())
        } else if is_me(session, to) {
            let query = session.add_query(from);
            (ChannelKind::Private, query.name().to_string())
        } else {
            debug!(to = %to, "PRIVMSG for unknown target");
            return;
        };

        let (message_kind, text) = classify(&msg.trailing);
        let mention = is_mention(text, session.nick(), kind == ChannelKind::Private);
        let entry = ChatMessage::builder()
            .kind(message_kind)
            .from(from)
            .to(to)
            .message(text)
            .hostmask(msg.prefix.clone())
            .mention(mention)
            .build();
        let Ok(entry) = entry else { return };

        let target = match kind {
            ChannelKind::Channel => session.channel_mut(&name),
            ChannelKind::Private => session.query_mut(&name),
        };
        if let Some(chan) = target {
            chan.bump_unread();
        }
        session.append(kind, &name, entry);
    }
}

/// Logged on the session. Notices from NickServ also land in a query.
pub struct NoticeHandler;

impl Handler for NoticeHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let from = msg.source_nick();
        if from.is_empty() {
            // Prefix-less notices come from the server we are talking to.
            debug!("NOTICE without an origin");
            let host = session.hostname().unwrap_or(session.server().host.as_str()).to_string();
            let mut entry = ChatMessage::new(MessageKind::Notice, msg.trailing.clone());
            entry.from = host;
            session.push_log(entry);
            return;
        }

        if from.eq_ignore_ascii_case(NICKSERV) {
            session.add_query(NICKSERV);
            let mut entry = ChatMessage::new(MessageKind::Notice, msg.trailing.clone());
            entry.from = NICKSERV.to_string();
            entry.to = session.identity().nickname.clone();
            session.append(ChannelKind::Private, NICKSERV, entry);
        }

        let mut entry = ChatMessage::new(MessageKind::Notice, msg.trailing.clone());
        entry.from = from.to_string();
        session.push_log(entry);
    }
}
