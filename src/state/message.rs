//! Log entries kept by sessions and channels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// What a log entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Message,
    Action,
    Notice,
    Info,
    Error,
    Motd,
    Topic,
}

/// One entry in a session or channel log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostmask: Option<String>,
    #[serde(default)]
    pub mention: bool,
    /// Display name of the owning channel, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub ts: DateTime<Utc>,
}

impl ChatMessage {
    /// Start building an entry. The kind must be set before [`build`](ChatMessageBuilder::build).
    pub fn builder() -> ChatMessageBuilder {
        ChatMessageBuilder::default()
    }

    /// An informational line with no sender.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Info, text)
    }

    pub(crate) fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            from: String::new(),
            to: String::new(),
            message: text.into(),
            hostmask: None,
            mention: false,
            channel: None,
            ts: Utc::now(),
        }
    }
}

/// Builder for [`ChatMessage`].
#[derive(Debug, Clone, Default)]
pub struct ChatMessageBuilder {
    kind: Option<MessageKind>,
    from: String,
    to: String,
    message: String,
    hostmask: Option<String>,
    mention: bool,
    ts: Option<DateTime<Utc>>,
}

impl ChatMessageBuilder {
    #[must_use]
    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn hostmask(mut self, hostmask: impl Into<String>) -> Self {
        self.hostmask = Some(hostmask.into());
        self
    }

    #[must_use]
    pub fn mention(mut self, mention: bool) -> Self {
        self.mention = mention;
        self
    }

    #[must_use]
    pub fn ts(mut self, ts: DateTime<Utc>) -> Self {
        self.ts = Some(ts);
        self
    }

    /// Finish the entry.
    ///
    /// # Errors
    ///
    /// [`SessionError::MissingMessageKind`] when no kind was set.
    pub fn build(self) -> Result<ChatMessage, SessionError> {
        let kind = self.kind.ok_or(SessionError::MissingMessageKind)?;
        Ok(ChatMessage {
            kind,
            from: self.from,
            to: self.to,
            message: self.message,
            hostmask: self.hostmask,
            mention: self.mention,
            channel: None,
            ts: self.ts.unwrap_or_else(Utc::now),
        })
    }
}
