//! Inbound message handlers.
//!
//! Each handler is a unit struct registered under the resolved command name
//! it reacts to. Handlers run to completion against the session before the
//! next message is dispatched. Replies the session does not recognize, or
//! that name a channel it does not know, are skipped with a trace.

mod channel;
mod messaging;
mod registry;
mod startup;
mod user;
mod whois;

use slirc_proto::WireMessage;

use crate::session::Session;

pub use registry::Registry;

/// Reacts to one kind of inbound message.
pub trait Handler: Send + Sync {
    fn handle(&self, session: &mut Session, msg: &WireMessage);
}

/// Whether `nick` is the session's own current nickname.
fn is_me(session: &Session, nick: &str) -> bool {
    nick.eq_ignore_ascii_case(session.nick())
}

/// `text`, with ` (reason)` appended when there is one.
fn with_reason(text: String, reason: &str) -> String {
    if reason.is_empty() {
        text
    } else {
        format!("{text} ({reason})")
    }
}
