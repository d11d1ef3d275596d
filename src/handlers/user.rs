//! Nickname changes.

use slirc_proto::WireMessage;

use super::{Handler, is_me};
use crate::session::Session;
use crate::state::MessageKind;

pub struct NickHandler;

impl Handler for NickHandler {
    fn handle(&self, session: &mut Session, msg: &WireMessage) {
        let from = msg.source_nick();
        let to = msg.text();
        if from.is_empty() || to.is_empty() {
            return;
        }

        if is_me(session, from) {
            session.update_my_nick(to);
            session.log_line(MessageKind::Info, format!("You are now known as {to}"));
        }
        session.rename_nick(from, to);
    }
}
