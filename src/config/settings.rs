//! Per-session settings.
//!
//! Keys keep their dotted names on the wire so exported snapshots read the
//! same as a hand-written `[settings]` table.

use serde::{Deserialize, Serialize};

use super::defaults::{default_message_limit, default_part_message, default_true};

/// Settings consulted by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Connect as soon as the session is built.
    #[serde(rename = "connect.auto")]
    pub auto_connect: bool,
    /// Log joins, parts and nick changes into channels.
    #[serde(rename = "log.events", default = "default_true")]
    pub log_events: bool,
    /// Maximum number of entries kept per log.
    #[serde(rename = "messages.limit", default = "default_message_limit")]
    pub message_limit: usize,
    /// Text sent with PART.
    #[serde(rename = "part.message", default = "default_part_message")]
    pub part_message: String,
    /// Join configured channels once registration completes.
    #[serde(rename = "channel.join.auto")]
    pub auto_join: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_connect: false,
            log_events: default_true(),
            message_limit: default_message_limit(),
            part_message: default_part_message(),
            auto_join: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.auto_connect);
        assert!(settings.log_events);
        assert_eq!(settings.message_limit, 300);
        assert!(!settings.auto_join);
    }

    #[test]
    fn test_dotted_keys_override() {
        let settings: Settings = toml::from_str(
            r#"
"connect.auto" = true
"messages.limit" = 50
"#,
        )
        .unwrap();
        assert!(settings.auto_connect);
        assert_eq!(settings.message_limit, 50);
        assert!(settings.log_events);
    }

    #[test]
    fn test_serializes_dotted_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["messages.limit"], 300);
        assert_eq!(json["log.events"], true);
    }
}
