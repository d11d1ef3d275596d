//! Channel membership, topic and mode handlers.

use chrono::DateTime;
use slirc_proto::{Hostmask, WireMessage};
use tracing::{debug, warn};

use super::{Handler, is_me, with_reason};
use crate::session::{Invite, Session, SessionEvent};
use crate::state::{ChannelKind, ChatMessage, MessageKind, UserInfo, split_prefixes};

/// RFC 2822-style date used for topic metadata.
const TOPIC_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn log_info(session: &mut Session, channel: &str, text: String) {
    session.append(ChannelKind::Channel, channel, ChatMessage::info(text));
}

// ============================================================================
// Membership
// ============================================================================

pub struct JoinHandler;

impl Handler for JoinHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let hostmask = msg.hostmask();
        let nick = hostmask.nick;
        let channel = msg.params.first().map_or(msg.trailing.as_str(), String::as_str);
        if channel.is_empty() {
            return;
        }
        if nick.is_empty() {
            debug!(channel = %channel, "JOIN without an origin");
            return;
        }

        if is_me(session, nick) {
            let chan = session.add_channel(channel);
            chan.mark_joined();
            let name = chan.name().to_string();
            debug!(channel = %name, "joined");
            session.channel_updated(&name);
            return;
        }

        let Some((chan, palette)) = session.channel_and_palette(channel) else {
            warn!(channel = %channel, "JOIN for unknown channel");
            return;
        };
        let mut info = UserInfo::new(nick).username(hostmask.username);
        if let Some(host) = hostmask.hostname {
            info = info.address(host);
        }
        let added = chan.add_user(info, palette);
        let name = chan.name().to_string();

        if added && session.settings().log_events {
            log_info(session, &name, format!("{nick} joined {name}"));
        } else {
            session.channel_updated(&name);
        }
    }
}

pub struct PartHandler;

impl Handler for PartHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let nick = msg.source_nick();
        let channel = msg.params.first().map_or(msg.trailing.as_str(), String::as_str);
        let reason = if msg.params.is_empty() { "" } else { msg.trailing.as_str() };

        if is_me(session, nick) {
            session.remove_channel(channel);
            return;
        }

        let Some(chan) = session.channel_mut(channel) else {
            warn!(channel = %channel, "PART for unknown channel");
            return;
        };
        if chan.remove_user(nick).is_none() {
            return;
        }
        let name = chan.name().to_string();

        if session.settings().log_events {
            log_info(session, &name, with_reason(format!("{nick} left {name}"), reason));
        } else {
            session.channel_updated(&name);
        }
    }
}

pub struct KickHandler;

impl Handler for KickHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let kicker = msg.source_nick();
        let channel = msg.param(0);
        let victim = msg.param(1);
        let reason = msg.trailing.as_str();

        if is_me(session, victim) {
            if let Some(chan) = session.remove_channel(channel) {
                let text = format!("You were kicked from {} by {kicker}", chan.name());
                session.log_line(MessageKind::Info, with_reason(text, reason));
            }
            return;
        }

        let Some(chan) = session.channel_mut(channel) else {
            warn!(channel = %channel, "KICK for unknown channel");
            return;
        };
        if chan.remove_user(victim).is_none() {
            return;
        }
        let name = chan.name().to_string();

        if session.settings().log_events {
            log_info(session, &name, with_reason(format!("{kicker} kicked {victim}"), reason));
        } else {
            session.channel_updated(&name);
        }
    }
}

pub struct QuitHandler;

impl Handler for QuitHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let nick = msg.source_nick();
        let channels = session.remove_everywhere(nick);
        let log_events = session.settings().log_events;
        for name in channels {
            if log_events {
                log_info(session, &name, with_reason(format!("{nick} quit"), &msg.trailing));
            } else {
                session.channel_updated(&name);
            }
        }
    }
}

// ============================================================================
// Rosters
// ============================================================================

/// RPL_NAMREPLY: bulk roster refresh, followed by a WHO for details.
pub struct NamesReplyHandler;

impl Handler for NamesReplyHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let channel = msg.params.last().map_or("", String::as_str);
        let Some((chan, palette)) = session.channel_and_palette(channel) else {
            warn!(channel = %channel, "RPL_NAMREPLY for unknown channel");
            return;
        };
        for entry in msg.trailing.split(' ').filter(|e| !e.is_empty()) {
            let (mode, nick) = split_prefixes(entry);
            if nick.is_empty() {
                continue;
            }
            chan.upsert_user(UserInfo::new(nick).mode(mode), palette);
        }
        let name = chan.name().to_string();
        session.write(format!("WHO {name}"));
        session.channel_updated(&name);
    }
}

/// RPL_WHOREPLY: `<me> <channel> <user> <host> <server> <nick> <flags> :<hops> <realname>`.
pub struct WhoReplyHandler;

impl Handler for WhoReplyHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let channel = msg.param(1);
        let nick = msg.param(5);
        if nick.is_empty() {
            return;
        }
        let realname = msg.trailing.split_once(' ').map_or("", |(_, rest)| rest);
        let info = UserInfo::new(nick)
            .username(msg.param(2).to_lowercase())
            .address(msg.param(3))
            .realname(realname)
            .mode(presence_stripped(msg.param(6)));

        let Some((chan, palette)) = session.channel_and_palette(channel) else {
            debug!(channel = %channel, "RPL_WHOREPLY for unknown channel");
            return;
        };
        let inserted = chan.upsert_user(info, palette);
        let name = chan.name().to_string();

        if inserted && session.settings().log_events {
            log_info(session, &name, format!("{nick} joined {name}"));
        } else {
            session.channel_updated(&name);
        }
    }
}

/// Drop the first here/gone marker from WHO flags.
fn presence_stripped(flags: &str) -> String {
    match flags.find(['H', 'G']) {
        Some(pos) => {
            let mut out = flags.to_string();
            out.remove(pos);
            out
        }
        None => flags.to_string(),
    }
}

// ============================================================================
// Topic
// ============================================================================

/// TOPIC changes and RPL_TOPIC replies.
pub struct TopicHandler;

impl Handler for TopicHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let (channel, who) = if msg.command == "TOPIC" {
            (msg.param(0), Some(msg.source_nick()))
        } else {
            (msg.param(1), None)
        };
        let Some(chan) = session.channel_mut(channel) else {
            warn!(channel = %channel, command = %msg.command, "topic for unknown channel");
            return;
        };
        let changed = chan.set_topic(&msg.trailing, who);
        let name = chan.name().to_string();

        if let Some(line) = changed {
            session.log_line(MessageKind::Topic, format!("{name}: {line}"));
            log_info(session, &name, line);
        }
        session.write(format!("MODE {name}"));
    }
}

/// RPL_TOPIC_WHO_TIME: `<me> <channel> <setter> <unix time>`.
pub struct TopicWhoTimeHandler;

impl Handler for TopicWhoTimeHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let setter = match Hostmask::nick_of(msg.param(2)) {
            "" => "Unknown",
            nick => nick,
        };
        let Some(at) = msg
            .param(3)
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        else {
            debug!(raw = %msg.raw, "unparseable topic time");
            return;
        };
        let at = at.format(TOPIC_DATE_FORMAT).to_string();

        let Some(chan) = session.channel_mut(msg.param(1)) else {
            warn!(channel = %msg.param(1), "RPL_TOPIC_WHO_TIME for unknown channel");
            return;
        };
        let changed = chan.set_topic_changed(setter, &at);
        let name = chan.name().to_string();
        if let Some(line) = changed {
            log_info(session, &name, line);
        }
    }
}

// ============================================================================
// Mode
// ============================================================================

/// RPL_CHANNELMODEIS: `<me> <channel> <modes> [args]`.
pub struct ChannelModeIsHandler;

impl Handler for ChannelModeIsHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let Some(chan) = session.channel_mut(msg.param(1)) else {
            warn!(channel = %msg.param(1), "RPL_CHANNELMODEIS for unknown channel");
            return;
        };
        let changed = chan.set_mode(msg.param(2));
        let name = chan.name().to_string();
        if let Some(line) = changed {
            log_info(session, &name, line);
        }
    }
}

/// MODE changes on a channel. User modes on ourselves are ignored.
pub struct ModeHandler;

impl Handler for ModeHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let actor = msg.source_nick();
        let target = msg.param(0);
        let delta = match msg.param(1) {
            "" => msg.trailing.as_str(),
            delta => delta,
        };
        if delta.is_empty() {
            return;
        }
        let args = msg.params.get(2..).unwrap_or_default();
        let mention = args.iter().any(|arg| is_me(session, arg));

        let Some(chan) = session.channel_mut(target) else {
            debug!(target = %target, "MODE for non-channel target");
            return;
        };
        chan.apply_mode_delta(delta, args);
        let name = chan.name().to_string();

        let suffix = if args.is_empty() {
            String::new()
        } else {
            format!(" {}", args.join(" "))
        };
        let mut entry = ChatMessage::info(format!("{actor} sets mode {delta}{suffix}"));
        entry.hostmask = Some(msg.prefix.clone());
        entry.mention = mention;
        session.append(ChannelKind::Channel, &name, entry);
    }
}

// ============================================================================
// Invitations
// ============================================================================

pub struct InviteHandler;

impl Handler for InviteHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let invite = Invite {
            hostmask: msg.prefix.clone(),
            from: msg.source_nick().to_string(),
            to: msg.param(0).to_lowercase(),
            channel: msg.text().to_string(),
        };
        session.emit(SessionEvent::Invite(invite));
    }
}
