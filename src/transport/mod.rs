//! Socket ownership and protocol plumbing.
//!
//! A [`Transport`] owns one plain or TLS socket, sends the registration
//! handshake, keeps the connection alive with PING checks, recovers from
//! nickname collisions, and turns every parsed line into a
//! [`TransportEvent`]. Callers talk to it through a cloneable
//! [`TransportHandle`].

mod error;
mod event_loop;
pub mod keepalive;
pub mod nick;
mod tls;

use std::sync::Arc;

use slirc_proto::{ReplyResolver, WireMessage};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

pub use error::TransportError;
pub use keepalive::{Keepalive, KeepaliveAction};
pub use nick::next_nickname;

use crate::config::{KeepaliveConfig, ServerTarget, SessionConfig, UserIdentity};
use event_loop::LoopContext;

// ============================================================================
// Configuration
// ============================================================================

/// Connection parameters for one transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub password: Option<String>,
    pub nickname: String,
    pub username: String,
    pub realname: String,
    pub alt_nickname: Option<String>,
    pub keepalive: KeepaliveConfig,
}

impl TransportConfig {
    pub fn new(user: &UserIdentity, server: &ServerTarget, keepalive: KeepaliveConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.effective_port(),
            secure: server.secure,
            password: user.password.clone(),
            nickname: user.nickname.clone(),
            username: user.username().to_string(),
            realname: user.realname().to_string(),
            alt_nickname: user.alt_nickname.clone(),
            keepalive,
        }
    }

    pub fn from_session(config: &SessionConfig) -> Self {
        Self::new(&config.user, &config.server, config.keepalive)
    }

    /// PASS (when configured), NICK, then USER.
    pub fn handshake_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            lines.push(format!("PASS {password}"));
        }
        lines.push(format!("NICK {}", self.nickname));
        lines.push(format!("USER {} 0 * :{}", self.username, self.realname));
        lines
    }
}

// ============================================================================
// Events
// ============================================================================

/// Everything a transport reports, in arrival order.
#[derive(Debug)]
pub enum TransportEvent {
    /// The handshake was written.
    Connected,
    /// A parsed message, command already resolved to its symbolic name.
    Message(Arc<WireMessage>),
    /// An `ERR_*` reply, emitted after its [`Message`](Self::Message).
    ProtocolError { command: String, message: String },
    /// Catch-all copy of every message, emitted last.
    Data(Arc<WireMessage>),
    /// Server name learned from the MOTD start reply.
    Hostname(String),
    /// The keepalive PING went unanswered; the socket is being closed.
    TimedOut,
    Error(TransportError),
    /// The socket is gone. Always the final event.
    Closed,
}

// ============================================================================
// Outbound
// ============================================================================

/// Destination for outbound protocol lines (without the terminator).
pub trait LineSink: Send + Sync {
    fn send_line(&self, line: String);
}

impl LineSink for mpsc::UnboundedSender<String> {
    fn send_line(&self, line: String) {
        if self.send(line).is_err() {
            trace!("line sink closed, dropping line");
        }
    }
}

/// Cloneable control handle for a running transport.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    outbound: mpsc::UnboundedSender<String>,
    shutdown: CancellationToken,
}

impl TransportHandle {
    /// Queue a line. Fire-and-forget: no acknowledgement, no backpressure.
    pub fn write(&self, line: impl Into<String>) {
        let line = line.into();
        debug!(line = %line, "write");
        if self.outbound.send(line).is_err() {
            trace!("transport stopped, dropping line");
        }
    }

    /// End the connection. Safe to call any number of times.
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            info!("closing transport");
        }
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl LineSink for TransportHandle {
    fn send_line(&self, line: String) {
        self.write(line);
    }
}

// ============================================================================
// Transport
// ============================================================================

pub struct Transport;

impl Transport {
    /// Open a socket to `config.host` and run the transport on it.
    ///
    /// Must be called within a Tokio runtime. Connection failures arrive as
    /// [`TransportEvent::Error`] followed by [`TransportEvent::Closed`].
    pub fn connect(
        config: TransportConfig,
        resolver: Arc<dyn ReplyResolver>,
    ) -> (TransportHandle, mpsc::UnboundedReceiver<TransportEvent>) {
        let (handle, ctx, events_rx) = Self::prepare(config, resolver);
        tokio::spawn(async move {
            let addr = format!("{}:{}", ctx.config.host, ctx.config.port);
            info!(addr = %addr, secure = ctx.config.secure, "connecting");

            let tcp = tokio::select! {
                _ = ctx.shutdown.cancelled() => {
                    ctx.emit(TransportEvent::Closed);
                    return;
                }
                result = TcpStream::connect(&addr) => result,
            };
            let tcp = match tcp {
                Ok(tcp) => tcp,
                Err(e) => {
                    ctx.fail(TransportError::Io(e));
                    return;
                }
            };

            if ctx.config.secure {
                let host = ctx.config.host.clone();
                match tls::upgrade_to_tls(tcp, &host).await {
                    Ok(stream) => event_loop::run(stream, ctx).await,
                    Err(e) => ctx.fail(e),
                }
            } else {
                event_loop::run(tcp, ctx).await;
            }
        });
        (handle, events_rx)
    }

    /// Run the transport over an already-established stream.
    ///
    /// Must be called within a Tokio runtime.
    pub fn with_stream<S>(
        stream: S,
        config: TransportConfig,
        resolver: Arc<dyn ReplyResolver>,
    ) -> (TransportHandle, mpsc::UnboundedReceiver<TransportEvent>)
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (handle, ctx, events_rx) = Self::prepare(config, resolver);
        tokio::spawn(event_loop::run(stream, ctx));
        (handle, events_rx)
    }

    fn prepare(
        config: TransportConfig,
        resolver: Arc<dyn ReplyResolver>,
    ) -> (TransportHandle, LoopContext, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let handle = TransportHandle {
            outbound: outbound_tx,
            shutdown: shutdown.clone(),
        };
        let ctx = LoopContext {
            config,
            resolver,
            events: events_tx,
            outbound: outbound_rx,
            shutdown,
        };
        (handle, ctx, events_rx)
    }
}
