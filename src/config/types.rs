//! Core configuration types and loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::{PLAIN_PORT, SECURE_PORT, default_idle_timeout, default_ping_timeout};
use super::settings::Settings;
use crate::state::ChannelSnapshot;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("name is required")]
    MissingName,
    #[error("user.nickname is required")]
    MissingNickname,
    #[error("server.host is required")]
    MissingHost,
}

/// The identity presented during registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub nickname: String,
    pub username: Option<String>,
    pub realname: Option<String>,
    /// Tried once when the configured nickname is taken.
    pub alt_nickname: Option<String>,
    /// Sent as PASS before registration. Never exported.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl UserIdentity {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Self::default()
        }
    }

    /// Username, falling back to the nickname.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nickname)
    }

    /// Realname, falling back to the nickname.
    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nickname)
    }
}

/// Where to connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTarget {
    #[serde(default)]
    pub host: String,
    pub port: Option<u16>,
    #[serde(default)]
    pub secure: bool,
}

impl ServerTarget {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Configured port, or 6697 for TLS and 6667 otherwise.
    pub fn effective_port(&self) -> u16 {
        self.port
            .unwrap_or(if self.secure { SECURE_PORT } else { PLAIN_PORT })
    }
}

/// Idle keepalive timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeepaliveConfig {
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            ping_timeout_secs: default_ping_timeout(),
        }
    }
}

/// Everything needed to build one [`Session`](crate::session::Session).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: UserIdentity,
    #[serde(default)]
    pub server: ServerTarget,
    /// Channels restored at construction.
    #[serde(default)]
    pub channels: Vec<ChannelSnapshot>,
    /// Queries restored at construction.
    #[serde(default)]
    pub queries: Vec<ChannelSnapshot>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
}

impl SessionConfig {
    pub fn new(name: impl Into<String>, user: UserIdentity, server: ServerTarget) -> Self {
        Self {
            name: name.into(),
            user,
            server,
            ..Self::default()
        }
    }

    /// Check required fields, failing on the first one missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        super::validation::validate(self).map_err(|mut errors| errors.remove(0))
    }
}

/// Top-level file read by the `slirc-client` binary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(flatten)]
    pub session: SessionConfig,
    /// Where to write the JSON snapshot on exit.
    pub snapshot_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        config.session.validate()?;
        Ok(config)
    }
}
