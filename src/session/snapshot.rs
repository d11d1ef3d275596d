//! Exported session state.

use serde::{Deserialize, Serialize};

use crate::config::{KeepaliveConfig, ServerTarget, SessionConfig, Settings, UserIdentity};
use crate::state::ChannelSnapshot;

/// Everything needed to rebuild a session later. The password is never
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub name: String,
    pub server: ServerTarget,
    pub user: UserIdentity,
    pub channels: Vec<ChannelSnapshot>,
    pub queries: Vec<ChannelSnapshot>,
    pub settings: Settings,
}

impl SessionSnapshot {
    /// Turn the snapshot back into construction input.
    pub fn into_config(self) -> SessionConfig {
        SessionConfig {
            name: self.name,
            user: self.user,
            server: self.server,
            channels: self.channels,
            queries: self.queries,
            settings: self.settings,
            keepalive: KeepaliveConfig::default(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
