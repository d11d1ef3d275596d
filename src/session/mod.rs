//! The session state machine.
//!
//! A [`Session`] is the single consumer of one transport's events and the
//! only writer of its channels, queries and rosters. Each inbound message is
//! handled to completion before the next one, so no state here is shared or
//! locked.

mod observer;
mod snapshot;
mod whois;

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use slirc_proto::{ReplyResolver, StaticReplies, WireMessage};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

pub use observer::{Invite, SessionEvent, SessionObserver};
pub use snapshot::SessionSnapshot;
pub use whois::{WhoisBook, WhoisRecord};

use crate::config::{ConfigError, KeepaliveConfig, ServerTarget, SessionConfig, Settings, UserIdentity};
use crate::error::SessionError;
use crate::handlers::Registry;
use crate::state::{
    Channel, ChannelKind, ChannelSnapshot, ChatMessage, ChatMessageBuilder, MessageKind, Palette,
    RotatingPalette, UserInfo,
};
use crate::transport::{LineSink, Transport, TransportConfig, TransportEvent, TransportHandle};

/// One server connection and all chat state attached to it.
pub struct Session {
    name: String,
    identity: UserIdentity,
    server: ServerTarget,
    settings: Settings,
    keepalive: KeepaliveConfig,
    /// Current nickname, as confirmed by the server.
    nick: String,
    hostname: Option<String>,
    channels: BTreeMap<String, Channel>,
    queries: BTreeMap<String, Channel>,
    log: VecDeque<ChatMessage>,
    panel: usize,
    palette: Box<dyn Palette>,
    whois: WhoisBook,
    observers: Vec<Arc<dyn SessionObserver>>,
    sink: Option<Arc<dyn LineSink>>,
    transport: Option<TransportHandle>,
    resolver: Arc<dyn ReplyResolver>,
    registry: Arc<Registry>,
    connected: bool,
    closed: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("nick", &self.nick)
            .field("server", &self.server)
            .field("channels", &self.channels.len())
            .field("queries", &self.queries.len())
            .field("connected", &self.connected)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session, restoring any channels and queries in `config`.
    ///
    /// # Errors
    ///
    /// Fails before any socket exists when the name, nickname or host is
    /// missing.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let SessionConfig {
            name,
            user,
            server,
            channels,
            queries,
            settings,
            keepalive,
        } = config;

        let mut session = Self {
            name,
            nick: user.nickname.clone(),
            identity: user,
            server,
            settings,
            keepalive,
            hostname: None,
            channels: BTreeMap::new(),
            queries: BTreeMap::new(),
            log: VecDeque::new(),
            panel: 0,
            palette: Box::new(RotatingPalette::default()),
            whois: WhoisBook::default(),
            observers: Vec::new(),
            sink: None,
            transport: None,
            resolver: Arc::new(StaticReplies),
            registry: Arc::new(Registry::new()),
            connected: false,
            closed: false,
        };

        for snapshot in channels {
            if snapshot.kind.is_none_or(|kind| kind == ChannelKind::Channel) {
                session.restore(snapshot, ChannelKind::Channel);
            }
        }
        for snapshot in queries {
            if snapshot.kind.is_none_or(|kind| kind == ChannelKind::Private) {
                session.restore(snapshot, ChannelKind::Private);
            }
        }
        debug!(
            session = %session.name,
            channels = session.channels.len(),
            queries = session.queries.len(),
            "session created"
        );
        Ok(session)
    }

    /// Replace the color source used for new roster members.
    #[must_use]
    pub fn with_palette(mut self, palette: Box<dyn Palette>) -> Self {
        self.palette = palette;
        self
    }

    /// Replace the numeric reply table handed to new transports.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ReplyResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    fn restore(&mut self, snapshot: ChannelSnapshot, kind: ChannelKind) {
        let key = snapshot.name.to_lowercase();
        let limit = self.settings.message_limit;
        let chan = Channel::restore(snapshot, kind, self.nick.clone(), limit);
        match kind {
            ChannelKind::Channel => {
                self.channels.insert(key, chan);
            }
            ChannelKind::Private => {
                self.queries.insert(key.clone(), chan);
                self.seed_query(&key);
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The session's current nickname.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn server(&self) -> &ServerTarget {
        &self.server
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Server name learned from the MOTD, if any.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&name.to_lowercase())
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&name.to_lowercase())
    }

    pub fn query(&self, name: &str) -> Option<&Channel> {
        self.queries.get(&name.to_lowercase())
    }

    pub fn query_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.queries.get_mut(&name.to_lowercase())
    }

    /// Channels ordered by key.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Queries ordered by key.
    pub fn queries(&self) -> impl Iterator<Item = &Channel> {
        self.queries.values()
    }

    /// The session-level log, oldest first.
    pub fn logs(&self) -> impl ExactSizeIterator<Item = &ChatMessage> {
        self.log.iter()
    }

    pub fn whois_book(&self) -> &WhoisBook {
        &self.whois
    }

    // ========================================================================
    // Observers and output
    // ========================================================================

    /// Register an observer. Observers are called in registration order.
    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Register a channel-backed observer and return its receiving end.
    pub fn events(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribe(Arc::new(tx));
        rx
    }

    /// Route outbound lines somewhere other than a transport.
    pub fn attach_sink(&mut self, sink: Arc<dyn LineSink>) {
        self.sink = Some(sink);
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// Send a raw protocol line. Dropped when nothing is attached.
    pub fn write(&self, line: impl Into<String>) {
        let line = line.into();
        match &self.sink {
            Some(sink) => sink.send_line(line),
            None => trace!(line = %line, "not connected, dropping line"),
        }
    }

    // ========================================================================
    // Connection lifecycle
    // ========================================================================

    /// Open the configured server connection.
    ///
    /// Must be called within a Tokio runtime. Feed the returned events back
    /// through [`handle_transport_event`](Self::handle_transport_event).
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] after [`close`](Self::close),
    /// [`SessionError::AlreadyConnected`] while a transport is attached.
    pub fn connect(&mut self) -> Result<mpsc::UnboundedReceiver<TransportEvent>, SessionError> {
        self.ensure_connectable()?;
        let config = self.transport_config();
        let (handle, events) = Transport::connect(config, Arc::clone(&self.resolver));
        self.attach_transport(handle);
        Ok(events)
    }

    /// Like [`connect`](Self::connect), over an existing stream.
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect).
    pub fn connect_with_stream<S>(
        &mut self,
        stream: S,
    ) -> Result<mpsc::UnboundedReceiver<TransportEvent>, SessionError>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        self.ensure_connectable()?;
        let config = self.transport_config();
        let (handle, events) = Transport::with_stream(stream, config, Arc::clone(&self.resolver));
        self.attach_transport(handle);
        Ok(events)
    }

    fn ensure_connectable(&self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        if self.transport.is_some() {
            return Err(SessionError::AlreadyConnected);
        }
        Ok(())
    }

    fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(&self.identity, &self.server, self.keepalive)
    }

    fn attach_transport(&mut self, handle: TransportHandle) {
        self.sink = Some(Arc::new(handle.clone()));
        self.transport = Some(handle);
    }

    /// Close the connection for good. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(handle) = self.transport.take() {
            handle.close();
        }
        if !self.closed {
            info!(session = %self.name, "session closed");
        }
        self.sink = None;
        self.connected = false;
        self.closed = true;
    }

    /// Apply one transport event.
    ///
    /// Ignored once the session is closed.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        if self.closed {
            trace!(session = %self.name, "session closed, dropping transport event");
            return;
        }
        match event {
            TransportEvent::Connected => {
                self.connected = true;
                let text = format!("Connected to {}", self.server.host);
                self.push_log(ChatMessage::info(text));
                let peers: Vec<String> = self.queries.values().map(|q| q.peer().to_string()).collect();
                for peer in peers {
                    self.whois(&peer);
                }
            }
            TransportEvent::Message(msg) => self.handle_message(&msg),
            TransportEvent::ProtocolError { command, message } => {
                debug!(command = %command, "protocol error reply");
                self.push_log(ChatMessage::new(MessageKind::Error, message));
            }
            TransportEvent::Data(msg) => trace!(command = %msg.command, "data"),
            TransportEvent::Hostname(hostname) => {
                debug!(hostname = %hostname, "server hostname");
                self.hostname = Some(hostname);
            }
            TransportEvent::TimedOut => {
                self.push_log(ChatMessage::new(MessageKind::Error, "Connection timed out"));
            }
            TransportEvent::Error(e) => {
                self.push_log(ChatMessage::new(MessageKind::Error, e.to_string()));
            }
            TransportEvent::Closed => {
                let was_connected = self.connected;
                self.connected = false;
                self.transport = None;
                self.sink = None;
                if was_connected {
                    self.push_log(ChatMessage::info("Disconnected"));
                }
            }
        }
    }

    /// Dispatch one message whose command is already resolved.
    ///
    /// Unknown commands are ignored, as is everything after [`close`](Self::close).
    pub fn handle_message(&mut self, msg: &WireMessage) {
        if self.closed {
            trace!(command = %msg.command, "session closed, dropping message");
            return;
        }
        let registry = Arc::clone(&self.registry);
        registry.dispatch(self, msg);
    }

    // ========================================================================
    // Logging
    // ========================================================================

    /// Append an entry to the session log.
    ///
    /// # Errors
    ///
    /// [`SessionError::MissingMessageKind`] when the builder has no kind.
    pub fn log(&mut self, builder: ChatMessageBuilder) -> Result<(), SessionError> {
        let msg = builder.build()?;
        self.push_log(msg);
        Ok(())
    }

    pub(crate) fn push_log(&mut self, msg: ChatMessage) {
        let limit = self.settings.message_limit;
        if limit > 0 {
            while self.log.len() >= limit {
                self.log.pop_front();
            }
            self.log.push_back(msg.clone());
        }
        self.emit(SessionEvent::Log(msg));
    }

    pub(crate) fn log_line(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.push_log(ChatMessage::new(kind, text));
    }

    /// Append to a channel or query log. Unknown targets are ignored.
    pub(crate) fn append(&mut self, kind: ChannelKind, name: &str, msg: ChatMessage) {
        let map = match kind {
            ChannelKind::Channel => &mut self.channels,
            ChannelKind::Private => &mut self.queries,
        };
        let Some(chan) = map.get_mut(&name.to_lowercase()) else {
            warn!(name = %name, "no such channel or query");
            return;
        };
        let mut events = Vec::new();
        record(chan, msg, &mut events);
        for event in events {
            self.emit(event);
        }
    }

    /// Run `f` over every channel and query, logging what it returns.
    pub(crate) fn broadcast(&mut self, mut f: impl FnMut(&mut Channel) -> Option<ChatMessage>) {
        let mut events = Vec::new();
        for chan in self.channels.values_mut().chain(self.queries.values_mut()) {
            if let Some(msg) = f(chan) {
                record(chan, msg, &mut events);
            }
        }
        for event in events {
            self.emit(event);
        }
    }

    pub(crate) fn channel_updated(&self, name: &str) {
        self.emit(SessionEvent::ChannelUpdated {
            name: name.to_string(),
        });
    }

    // ========================================================================
    // Outbound commands
    // ========================================================================

    /// Write a PRIVMSG without logging it. Multiple targets are joined with
    /// commas.
    pub fn send(&self, targets: &[&str], data: &str) {
        self.write(format!("PRIVMSG {} :{data}", targets.join(",")));
    }

    /// Send a message to a known channel or query and log it there.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownTarget`] when `target` is neither.
    pub fn send_message(&mut self, target: &str, text: &str) -> Result<(), SessionError> {
        self.send_logged(target, MessageKind::Message, text, text.to_string())
    }

    /// Send a CTCP ACTION to a known channel or query and log it there.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownTarget`] when `target` is neither.
    pub fn send_action(&mut self, target: &str, text: &str) -> Result<(), SessionError> {
        self.send_logged(target, MessageKind::Action, text, format!("\u{1}ACTION {text}\u{1}"))
    }

    fn send_logged(
        &mut self,
        target: &str,
        kind: MessageKind,
        text: &str,
        payload: String,
    ) -> Result<(), SessionError> {
        let (panel, name) = self
            .lookup(target)
            .map(|(panel, chan)| (panel, chan.name().to_string()))
            .ok_or_else(|| SessionError::UnknownTarget(target.to_string()))?;
        let msg = ChatMessage::builder()
            .kind(kind)
            .from(self.nick.clone())
            .to(name.clone())
            .message(text)
            .build()?;
        self.append(panel, &name, msg);
        self.send(&[&name], &payload);
        Ok(())
    }

    fn lookup(&self, target: &str) -> Option<(ChannelKind, &Channel)> {
        let key = target.to_lowercase();
        self.channels
            .get(&key)
            .map(|chan| (ChannelKind::Channel, chan))
            .or_else(|| self.queries.get(&key).map(|chan| (ChannelKind::Private, chan)))
    }

    pub fn join(&self, channel: &str) {
        self.write(format!("JOIN {channel}"));
    }

    /// Leave a channel with the configured part message and forget it.
    pub fn part(&mut self, channel: &str) {
        self.write(format!("PART {channel} :{}", self.settings.part_message));
        self.remove_channel(channel);
    }

    pub fn whois(&self, nick: &str) {
        self.write(format!("WHOIS {nick}"));
    }

    // ========================================================================
    // Channels and queries
    // ========================================================================

    /// The channel named `name`, created if it does not exist yet.
    pub fn add_channel(&mut self, name: &str) -> &mut Channel {
        let key = name.to_lowercase();
        if !self.channels.contains_key(&key) {
            debug!(channel = %name, "channel added");
            self.emit(SessionEvent::ChannelAdded {
                name: name.to_string(),
            });
        }
        let (nick, limit) = (self.nick.clone(), self.settings.message_limit);
        self.channels
            .entry(key)
            .or_insert_with(|| Channel::new(name, ChannelKind::Channel, nick, limit))
    }

    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let removed = self.channels.remove(&name.to_lowercase())?;
        self.clamp_panel();
        debug!(channel = %removed.name(), "channel removed");
        self.emit(SessionEvent::ChannelRemoved {
            name: removed.name().to_string(),
        });
        Some(removed)
    }

    /// The query with `peer`, created if it does not exist yet.
    ///
    /// A new query seeds its roster with both parties and asks the server
    /// for the peer's WHOIS.
    pub fn add_query(&mut self, peer: &str) -> &mut Channel {
        let key = peer.to_lowercase();
        let (nick, limit) = (self.nick.clone(), self.settings.message_limit);
        if !self.queries.contains_key(&key) {
            let chan = Channel::new(peer, ChannelKind::Private, nick.clone(), limit)
                .with_topic(format!("Conversation with {peer}"));
            self.queries.insert(key.clone(), chan);
            if let Some(peer) = self.seed_query(&key) {
                self.whois(&peer);
            }
            debug!(query = %peer, "query added");
            self.emit(SessionEvent::QueryAdded {
                name: peer.to_string(),
            });
        }
        self.queries
            .entry(key)
            .or_insert_with(|| Channel::new(peer, ChannelKind::Private, nick, limit))
    }

    /// Put both parties on a query's roster. Returns the peer.
    fn seed_query(&mut self, key: &str) -> Option<String> {
        let chan = self.queries.get_mut(key)?;
        let peer = chan.peer().to_string();
        chan.upsert_user(UserInfo::new(self.nick.clone()), self.palette.as_mut());
        chan.upsert_user(UserInfo::new(peer.clone()), self.palette.as_mut());
        Some(peer)
    }

    pub fn remove_query(&mut self, name: &str) -> Option<Channel> {
        let removed = self.queries.remove(&name.to_lowercase())?;
        self.clamp_panel();
        debug!(query = %removed.name(), "query removed");
        self.emit(SessionEvent::QueryRemoved {
            name: removed.name().to_string(),
        });
        Some(removed)
    }

    /// A channel together with the palette, for roster updates.
    pub(crate) fn channel_and_palette(&mut self, name: &str) -> Option<(&mut Channel, &mut dyn Palette)> {
        let chan = self.channels.get_mut(&name.to_lowercase())?;
        Some((chan, self.palette.as_mut()))
    }

    pub(crate) fn whois_book_mut(&mut self) -> &mut WhoisBook {
        &mut self.whois
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Adopt a new own nickname everywhere.
    pub(crate) fn update_my_nick(&mut self, nick: &str) {
        info!(from = %self.nick, to = %nick, "own nickname changed");
        self.nick = nick.to_string();
        self.broadcast(|chan| Some(ChatMessage::info(chan.update_my_nick(nick))));
    }

    /// Move `from` to `to` in every roster and rename a query keyed by it.
    pub(crate) fn rename_nick(&mut self, from: &str, to: &str) {
        let log_events = self.settings.log_events;
        let own = to == self.nick;
        let line = format!("{from} is now known as {to}");

        let mut events = Vec::new();
        for chan in self.channels.values_mut() {
            if chan.rename_user(from, to) {
                if log_events && !own {
                    record(chan, ChatMessage::info(line.clone()), &mut events);
                } else {
                    events.push(SessionEvent::ChannelUpdated {
                        name: chan.name().to_string(),
                    });
                }
            }
        }

        let to_key = to.to_lowercase();
        if let Some(mut query) = self.queries.remove(&from.to_lowercase()) {
            query.rename_user(from, to);
            query.rename_peer(to);
            if log_events {
                record(&mut query, ChatMessage::info(line.clone()), &mut events);
            }
            match self.queries.get_mut(&to_key) {
                // A query with the new nick already exists: fold this one into it.
                Some(existing) => {
                    debug!(from = %from, to = %to, "merging queries");
                    existing.absorb_log(query);
                    events.push(SessionEvent::QueryRemoved {
                        name: from.to_string(),
                    });
                    events.push(SessionEvent::ChannelUpdated {
                        name: existing.name().to_string(),
                    });
                    self.clamp_panel();
                }
                None => {
                    self.queries.insert(to_key, query);
                }
            }
        }
        for query in self.queries.values_mut() {
            query.rename_user(from, to);
        }

        for event in events {
            self.emit(event);
        }
    }

    /// Remove `nick` from every channel roster. Returns the channels it left.
    pub(crate) fn remove_everywhere(&mut self, nick: &str) -> Vec<String> {
        self.channels
            .values_mut()
            .filter_map(|chan| chan.remove_user(nick).map(|_| chan.name().to_string()))
            .collect()
    }

    // ========================================================================
    // Panels
    // ========================================================================

    fn panel_count(&self) -> usize {
        self.channels.len() + self.queries.len()
    }

    fn clamp_panel(&mut self) {
        let count = self.panel_count();
        if self.panel >= count {
            self.panel = count.saturating_sub(1);
        }
    }

    /// The selected channel or query. Channels come first, then queries,
    /// each ordered by key.
    pub fn current_panel(&self) -> Option<&Channel> {
        self.channels
            .values()
            .chain(self.queries.values())
            .nth(self.panel)
    }

    pub fn next_panel(&mut self) -> Option<&Channel> {
        let count = self.panel_count();
        if count == 0 {
            return None;
        }
        self.panel = (self.panel + 1) % count;
        self.current_panel()
    }

    pub fn previous_panel(&mut self) -> Option<&Channel> {
        let count = self.panel_count();
        if count == 0 {
            return None;
        }
        self.panel = (self.panel + count - 1) % count;
        self.current_panel()
    }

    // ========================================================================
    // Export
    // ========================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut user = self.identity.clone();
        user.password = None;
        SessionSnapshot {
            name: self.name.clone(),
            server: self.server.clone(),
            user,
            channels: self.channels.values().map(Channel::snapshot).collect(),
            queries: self.queries.values().map(Channel::snapshot).collect(),
            settings: self.settings.clone(),
        }
    }
}

/// Push into a channel log and queue the events that go with it.
fn record(chan: &mut Channel, mut msg: ChatMessage, events: &mut Vec<SessionEvent>) {
    let channel = chan.name().to_string();
    msg.channel = Some(channel.clone());
    chan.push_message(msg.clone());
    if msg.mention {
        events.push(SessionEvent::Mention {
            channel: channel.clone(),
            message: msg.clone(),
        });
    }
    events.push(SessionEvent::ChannelLog {
        channel: channel.clone(),
        message: msg,
    });
    events.push(SessionEvent::ChannelUpdated { name: channel });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig::new("freenode", UserIdentity::new("evan"), ServerTarget::new("irc.example.net"))
    }

    #[test]
    fn test_missing_name_fails() {
        let mut config = config();
        config.name.clear();
        assert!(matches!(Session::new(config), Err(ConfigError::MissingName)));
    }

    #[test]
    fn test_missing_host_fails() {
        let mut config = config();
        config.server.host.clear();
        assert!(matches!(Session::new(config), Err(ConfigError::MissingHost)));
    }

    #[test]
    fn test_restore_filters_by_kind() {
        let mut config = config();
        let mut query_in_channels = ChannelSnapshot::new("bob");
        query_in_channels.kind = Some(ChannelKind::Private);
        config.channels = vec![ChannelSnapshot::new("#rust"), query_in_channels];
        config.queries = vec![ChannelSnapshot::new("alice")];

        let session = Session::new(config).unwrap();
        assert_eq!(session.channels().count(), 1);
        assert!(session.channel("#RUST").is_some());
        let alice = session.query("alice").unwrap();
        assert!(alice.has_user("evan"));
        assert!(alice.has_user("alice"));
    }

    #[test]
    fn test_log_requires_kind() {
        let mut session = Session::new(config()).unwrap();
        let err = session.log(ChatMessage::builder().message("hi")).unwrap_err();
        assert!(matches!(err, SessionError::MissingMessageKind));
        assert_eq!(session.logs().len(), 0);

        session
            .log(ChatMessage::builder().kind(MessageKind::Info).message("hi"))
            .unwrap();
        assert_eq!(session.logs().len(), 1);
    }

    #[test]
    fn test_session_log_is_bounded() {
        let mut config = config();
        config.settings.message_limit = 3;
        let mut session = Session::new(config).unwrap();
        for i in 0..5 {
            session.log_line(MessageKind::Info, i.to_string());
        }
        let kept: Vec<_> = session.logs().map(|m| m.message.as_str()).collect();
        assert_eq!(kept, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_panels_wrap() {
        let mut session = Session::new(config()).unwrap();
        assert!(session.next_panel().is_none());
        session.add_channel("#b");
        session.add_channel("#a");
        session.add_query("zed");

        assert_eq!(session.current_panel().unwrap().name(), "#a");
        assert_eq!(session.next_panel().unwrap().name(), "#b");
        assert_eq!(session.next_panel().unwrap().name(), "zed");
        assert_eq!(session.next_panel().unwrap().name(), "#a");
        assert_eq!(session.previous_panel().unwrap().name(), "zed");

        session.remove_query("zed");
        assert_eq!(session.current_panel().unwrap().name(), "#b");
    }

    #[test]
    fn test_send_message_unknown_target() {
        let mut session = Session::new(config()).unwrap();
        let err = session.send_message("#nowhere", "hi").unwrap_err();
        assert!(matches!(err, SessionError::UnknownTarget(t) if t == "#nowhere"));
    }

    #[test]
    fn test_snapshot_excludes_password() {
        let mut config = config();
        config.user.password = Some("hunter2".into());
        let mut session = Session::new(config).unwrap();
        session.add_channel("#rust");

        let snapshot = session.snapshot();
        assert!(snapshot.user.password.is_none());
        let json = snapshot.to_json().unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("\"#rust\""));
    }

    #[test]
    fn test_close_is_idempotent_and_final() {
        let mut session = Session::new(config()).unwrap();
        session.close();
        session.close();
        assert!(session.is_closed());
        assert!(matches!(session.connect(), Err(SessionError::Closed)));
    }
}
