//! Registration banners, MOTD, away status and server PING.

use slirc_proto::WireMessage;
use tracing::debug;

use super::Handler;
use crate::session::Session;
use crate::state::MessageKind;

/// RPL_WELCOME: adopt the confirmed nickname and log the banner.
pub struct WelcomeHandler;

impl Handler for WelcomeHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let confirmed = msg.param(0);
        if !confirmed.is_empty() && confirmed != session.nick() {
            session.update_my_nick(confirmed);
        }
        session.log_line(MessageKind::Info, msg.trailing.clone());

        if session.settings().auto_join {
            let names: Vec<String> = session.channels().map(|c| c.name().to_string()).collect();
            debug!(count = names.len(), "auto-joining channels");
            for name in names {
                session.join(&name);
            }
        }
    }
}

/// Server and user-count banners, logged verbatim.
pub struct BannerHandler;

impl Handler for BannerHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session.log_line(MessageKind::Info, msg.trailing.clone());
    }
}

/// 396: displayed host changed.
pub struct HostHiddenHandler;

impl Handler for HostHiddenHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session.log_line(MessageKind::Info, format!("{} {}", msg.param(1), msg.trailing));
    }
}

pub struct MotdHandler;

impl Handler for MotdHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session.log_line(MessageKind::Motd, msg.trailing.clone());
    }
}

/// RPL_NOWAWAY / RPL_UNAWAY.
pub struct AwayStatusHandler;

impl Handler for AwayStatusHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let status = if msg.command == "RPL_UNAWAY" { "unaway" } else { "away" };
        session.log_line(MessageKind::Info, format!("{status}: {}", msg.trailing));
    }
}

pub struct PingHandler;

impl Handler for PingHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session.write(format!("PONG :{}", msg.text()));
    }
}
