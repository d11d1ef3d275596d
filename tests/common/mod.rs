//! Integration test common infrastructure.
//!
//! A session wired to in-memory sinks, and a fake server on the far end of
//! an in-memory duplex socket.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use slirc_client::config::{ServerTarget, SessionConfig, UserIdentity};
use slirc_client::session::{Session, SessionEvent};
use slirc_client::transport::TransportEvent;
use slirc_proto::{ReplyResolver, StaticReplies, WireMessage};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};
use tokio::sync::mpsc;

pub fn session_config() -> SessionConfig {
    let mut user = UserIdentity::new("evan");
    user.username = Some("evan".into());
    user.realname = Some("Evan Lucas".into());
    SessionConfig::new("freenode", user, ServerTarget::new("irc.example.net"))
}

/// Parse a line and resolve its numeric the way the transport does.
pub fn resolve(line: &str) -> WireMessage {
    let msg = WireMessage::parse(line).expect("test line should parse");
    match StaticReplies.resolve(&msg.command) {
        Some(name) => msg.with_command(name),
        None => msg,
    }
}

/// A session driven directly with parsed lines.
pub struct TestSession {
    pub session: Session,
    lines: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with_config(session_config())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let mut session = Session::new(config).expect("valid config");
        let (tx, lines) = mpsc::unbounded_channel();
        session.attach_sink(Arc::new(tx));
        let events = session.events();
        Self {
            session,
            lines,
            events,
        }
    }

    pub fn feed(&mut self, line: &str) {
        let msg = resolve(line);
        self.session.handle_message(&msg);
    }

    /// Lines written since the last call.
    pub fn written(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(line) = self.lines.try_recv() {
            out.push(line);
        }
        out
    }

    /// Events emitted since the last call.
    pub fn events(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    /// Join `channel` as ourselves and discard the resulting output.
    pub fn joined(&mut self, channel: &str) {
        self.feed(&format!(":evan!evan@host JOIN {channel}"));
        self.written();
        self.events();
    }
}

/// The server side of a duplex socket.
pub struct FakeServer {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl FakeServer {
    /// A connected pair: the client end and the fake server.
    pub fn pair() -> (DuplexStream, Self) {
        Self::pair_with_capacity(8192)
    }

    /// A pair whose socket buffer holds at most `capacity` bytes each way.
    pub fn pair_with_capacity(capacity: usize) -> (DuplexStream, Self) {
        let (client, server) = tokio::io::duplex(capacity);
        let (read_half, writer) = tokio::io::split(server);
        let server = Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        };
        (client, server)
    }

    pub async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .expect("write to client");
        self.writer.flush().await.expect("flush to client");
    }

    /// Next line from the client, without the terminator.
    pub async fn recv(&mut self) -> String {
        let line = self
            .lines
            .next_line()
            .await
            .expect("read from client")
            .expect("client closed");
        line.trim_end_matches('\r').to_string()
    }

    /// Next line, or `None` once the client has closed.
    pub async fn try_recv(&mut self) -> Option<String> {
        self.lines
            .next_line()
            .await
            .ok()
            .flatten()
            .map(|line| line.trim_end_matches('\r').to_string())
    }
}

/// Next transport event, failing the test if none arrives in time.
pub async fn next_event(events: &mut mpsc::UnboundedReceiver<TransportEvent>) -> TransportEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("transport event in time")
        .expect("transport still running")
}

/// Everything until the channel closes.
pub async fn collect_until_closed(
    events: &mut mpsc::UnboundedReceiver<TransportEvent>,
) -> Vec<TransportEvent> {
    let mut out = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(5), events.recv()).await {
        out.push(event);
    }
    out
}
