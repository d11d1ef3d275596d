//! Command handler registry and dispatch.

use std::collections::HashMap;

use slirc_proto::WireMessage;
use tracing::trace;

use super::Handler;
use super::channel::{
    ChannelModeIsHandler, InviteHandler, JoinHandler, KickHandler, ModeHandler, NamesReplyHandler,
    PartHandler, QuitHandler, TopicHandler, TopicWhoTimeHandler, WhoReplyHandler,
};
use super::messaging::{NoticeHandler, PrivmsgHandler};
use super::startup::{
    AwayStatusHandler, BannerHandler, HostHiddenHandler, MotdHandler, PingHandler, WelcomeHandler,
};
use super::user::NickHandler;
use super::whois::{
    AwayHandler, EndOfWhoisHandler, WhoisChannelsHandler, WhoisIdleHandler, WhoisOperatorHandler,
    WhoisServerHandler, WhoisUserHandler,
};
use crate::session::Session;

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a registry with every handler registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Startup and informational replies
        handlers.insert("RPL_WELCOME", Box::new(WelcomeHandler));
        for banner in [
            "RPL_YOURHOST",
            "RPL_CREATED",
            "RPL_LUSERCLIENT",
            "RPL_LUSERME",
            "RPL_LOCALUSERS",
            "RPL_GLOBALUSERS",
            "RPL_STATSCONN",
        ] {
            handlers.insert(banner, Box::new(BannerHandler));
        }
        handlers.insert("396", Box::new(HostHiddenHandler));
        handlers.insert("RPL_MOTDSTART", Box::new(MotdHandler));
        handlers.insert("RPL_MOTD", Box::new(MotdHandler));
        handlers.insert("RPL_ENDOFMOTD", Box::new(MotdHandler));
        handlers.insert("RPL_NOWAWAY", Box::new(AwayStatusHandler));
        handlers.insert("RPL_UNAWAY", Box::new(AwayStatusHandler));
        handlers.insert("PING", Box::new(PingHandler));

        // WHOIS sequence
        handlers.insert("RPL_WHOISUSER", Box::new(WhoisUserHandler));
        handlers.insert("RPL_WHOISCHANNELS", Box::new(WhoisChannelsHandler));
        handlers.insert("RPL_WHOISSERVER", Box::new(WhoisServerHandler));
        handlers.insert("RPL_WHOISOPERATOR", Box::new(WhoisOperatorHandler));
        handlers.insert("RPL_WHOISIDLE", Box::new(WhoisIdleHandler));
        handlers.insert("RPL_AWAY", Box::new(AwayHandler));
        handlers.insert("RPL_ENDOFWHOIS", Box::new(EndOfWhoisHandler));

        // Channel membership, topic and mode
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("KICK", Box::new(KickHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));
        handlers.insert("RPL_NAMREPLY", Box::new(NamesReplyHandler));
        handlers.insert("RPL_WHOREPLY", Box::new(WhoReplyHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler));
        handlers.insert("RPL_TOPIC", Box::new(TopicHandler));
        handlers.insert("RPL_TOPIC_WHO_TIME", Box::new(TopicWhoTimeHandler));
        handlers.insert("RPL_CHANNELMODEIS", Box::new(ChannelModeIsHandler));
        handlers.insert("MODE", Box::new(ModeHandler));
        handlers.insert("INVITE", Box::new(InviteHandler));

        // Messaging and identity
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));
        handlers.insert("NOTICE", Box::new(NoticeHandler));
        handlers.insert("NICK", Box::new(NickHandler));

        Self { handlers }
    }

    /// Run the handler registered for `msg.command`, if any.
    pub fn dispatch(&self, session: &mut Session, msg: &WireMessage) {
        match self.handlers.get(msg.command.as_str()) {
            Some(handler) => handler.handle(session, msg),
            None => trace!(command = %msg.command, "no handler"),
        }
    }

    pub fn handles(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_core_commands() {
        let registry = Registry::new();
        for command in ["RPL_WELCOME", "PING", "JOIN", "PRIVMSG", "NICK", "RPL_ENDOFWHOIS", "396"] {
            assert!(registry.handles(command), "{command} not registered");
        }
        assert!(!registry.handles("001"));
    }
}
