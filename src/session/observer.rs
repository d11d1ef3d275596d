//! Session events and the observer seam.

use tokio::sync::mpsc;
use tracing::trace;

use super::whois::WhoisRecord;
use crate::state::ChatMessage;

/// An invitation, passed through without touching state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    /// Full origin as received.
    pub hostmask: String,
    pub from: String,
    /// Invitee, lowercased.
    pub to: String,
    pub channel: String,
}

/// Everything a session reports to its observers.
///
/// Channel-scoped events carry the display name of the channel or query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session-level informational entry.
    Log(ChatMessage),
    ChannelAdded { name: String },
    ChannelRemoved { name: String },
    QueryAdded { name: String },
    QueryRemoved { name: String },
    /// State of a channel or query changed.
    ChannelUpdated { name: String },
    ChannelLog { channel: String, message: ChatMessage },
    /// Emitted before the matching [`ChannelLog`](Self::ChannelLog).
    Mention { channel: String, message: ChatMessage },
    Whois(WhoisRecord),
    Invite(Invite),
}

/// Receives session events in registration order.
///
/// Called synchronously from inside the state machine; implementations must
/// not block.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

impl SessionObserver for mpsc::UnboundedSender<SessionEvent> {
    fn on_event(&self, event: &SessionEvent) {
        if self.send(event.clone()).is_err() {
            trace!("session observer dropped");
        }
    }
}
