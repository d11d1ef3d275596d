//! WHOIS reply handlers. Every reply carries the target in the second
//! parameter.

use slirc_proto::WireMessage;
use tracing::{debug, warn};

use super::Handler;
use crate::session::{Session, SessionEvent};

pub struct WhoisUserHandler;

impl Handler for WhoisUserHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session
            .whois_book_mut()
            .user(msg.param(1), msg.param(2), msg.param(3), &msg.trailing);
    }
}

pub struct WhoisChannelsHandler;

impl Handler for WhoisChannelsHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session.whois_book_mut().channels(msg.param(1), &msg.trailing);
    }
}

pub struct WhoisServerHandler;

impl Handler for WhoisServerHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session.whois_book_mut().server(msg.param(1), msg.param(2));
    }
}

pub struct WhoisOperatorHandler;

impl Handler for WhoisOperatorHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session.whois_book_mut().oper(msg.param(1));
    }
}

pub struct WhoisIdleHandler;

impl Handler for WhoisIdleHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        session
            .whois_book_mut()
            .idle(msg.param(1), msg.param(2), msg.param(3));
    }
}

/// RPL_AWAY.
pub struct AwayHandler;

impl Handler for AwayHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        if !session.whois_book_mut().away(msg.param(1), &msg.trailing) {
            debug!(nick = %msg.param(1), "away reply outside whois");
        }
    }
}

pub struct EndOfWhoisHandler;

impl Handler for EndOfWhoisHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let target = msg.param(1);
        match session.whois_book_mut().finish(target) {
            Some(record) => session.emit(SessionEvent::Whois(record)),
            None => warn!(nick = %target, "end of whois for unknown target"),
        }
    }
}
