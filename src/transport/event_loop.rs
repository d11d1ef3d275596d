//! The per-connection select loop.
//!
//! One task owns both halves of the socket. It multiplexes inbound frames,
//! queued outbound lines, the keepalive deadline and the shutdown token, and
//! funnels everything it learns into the event channel in arrival order.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use slirc_proto::{IrcCodec, LineCodec, ProtocolError, ReplyResolver, WireMessage};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::keepalive::{Keepalive, KeepaliveAction, time_token};
use super::nick::next_nickname;
use super::{TransportConfig, TransportError, TransportEvent};

const NICKNAME_IN_USE: &str = "ERR_NICKNAMEINUSE";
const MOTD_START: &str = "RPL_MOTDSTART";
const ERROR_PREFIX: &str = "ERR_";

/// How long the final flush may wait on a peer that is not reading.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// State moved into the connection task.
pub(super) struct LoopContext {
    pub(super) config: TransportConfig,
    pub(super) resolver: Arc<dyn ReplyResolver>,
    pub(super) events: mpsc::UnboundedSender<TransportEvent>,
    pub(super) outbound: mpsc::UnboundedReceiver<String>,
    pub(super) shutdown: CancellationToken,
}

impl LoopContext {
    pub(super) fn emit(&self, event: TransportEvent) {
        if self.events.send(event).is_err() {
            trace!("event receiver dropped");
        }
    }

    /// Report a fatal error and finish.
    pub(super) fn fail(&self, error: TransportError) {
        warn!(error = %error, "transport failed");
        self.shutdown.cancel();
        self.emit(TransportEvent::Error(error));
        self.emit(TransportEvent::Closed);
    }
}

enum SelectResult {
    /// One inbound frame, parsed or not
    Inbound(Bytes),
    /// A queued outbound line
    Outbound(String),
    /// The keepalive deadline passed
    Timer,
    /// The read half failed
    ReadError(ProtocolError),
    /// The peer closed the socket
    Eof,
    /// Close requested, or every handle dropped
    Shutdown,
}

/// Why a write was abandoned.
enum WriteStop {
    Failed(ProtocolError),
    TimedOut,
    Shutdown,
}

type LineWriter<W> = FramedWrite<W, IrcCodec>;

pub(super) async fn run<S>(stream: S, mut ctx: LoopContext)
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = FramedRead::new(read_half, LineCodec::new());
    let mut writer = FramedWrite::new(write_half, IrcCodec::new());
    let mut keepalive = Keepalive::new(&ctx.config.keepalive, Instant::now());

    let mut queue: VecDeque<String> = ctx.config.handshake_lines().into();
    match flush_queue(&mut writer, &mut queue, &ctx, &mut keepalive).await {
        Ok(()) => {}
        Err(WriteStop::Failed(e)) => {
            ctx.fail(e.into());
            return;
        }
        Err(WriteStop::TimedOut) => {
            ctx.emit(TransportEvent::TimedOut);
            finish(writer, &ctx).await;
            return;
        }
        Err(WriteStop::Shutdown) => {
            finish(writer, &ctx).await;
            return;
        }
    }
    info!(nick = %ctx.config.nickname, "handshake sent");
    ctx.emit(TransportEvent::Connected);

    loop {
        let result = tokio::select! {
            biased;
            _ = ctx.shutdown.cancelled() => SelectResult::Shutdown,
            frame = reader.next() => match frame {
                Some(Ok(frame)) => SelectResult::Inbound(frame),
                Some(Err(e)) => SelectResult::ReadError(e),
                None => SelectResult::Eof,
            },
            line = ctx.outbound.recv() => match line {
                Some(line) => SelectResult::Outbound(line),
                None => SelectResult::Shutdown,
            },
            _ = tokio::time::sleep_until(keepalive.deadline()) => SelectResult::Timer,
        };

        match result {
            SelectResult::Inbound(frame) => {
                keepalive.record_activity(Instant::now());
                if let Some(msg) = IrcCodec::parse_line(&frame) {
                    queue.extend(process_inbound(&ctx, &mut keepalive, msg));
                }
            }
            SelectResult::Outbound(line) => queue.push_back(line),
            SelectResult::Timer => match keepalive.poll(Instant::now(), time_token) {
                KeepaliveAction::Wait => {}
                KeepaliveAction::SendPing(token) => {
                    debug!(token = %token, "idle, sending keepalive ping");
                    queue.push_back(format!("PING :{token}"));
                }
                KeepaliveAction::TimedOut => {
                    warn!("keepalive ping expired");
                    ctx.emit(TransportEvent::TimedOut);
                    break;
                }
            },
            SelectResult::ReadError(e) => {
                ctx.emit(TransportEvent::Error(e.into()));
                break;
            }
            SelectResult::Eof => {
                info!("server closed the connection");
                break;
            }
            SelectResult::Shutdown => break,
        }

        match flush_queue(&mut writer, &mut queue, &ctx, &mut keepalive).await {
            Ok(()) => {}
            Err(WriteStop::Failed(e)) => {
                ctx.emit(TransportEvent::Error(e.into()));
                break;
            }
            Err(WriteStop::TimedOut) => {
                warn!("keepalive ping expired while a write was pending");
                ctx.emit(TransportEvent::TimedOut);
                break;
            }
            Err(WriteStop::Shutdown) => break,
        }
    }

    keepalive.cancel();
    finish(writer, &ctx).await;
}

/// Write every queued line in order.
///
/// Each send races the shutdown token and the keepalive deadline, so a
/// peer that stops reading can neither block a close nor outlive its
/// PING timeout. A PING that falls due mid-send is queued behind it.
async fn flush_queue<W>(
    writer: &mut LineWriter<W>,
    queue: &mut VecDeque<String>,
    ctx: &LoopContext,
    keepalive: &mut Keepalive,
) -> Result<(), WriteStop>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = queue.pop_front() {
        trace!(line = %line, "send");
        let send = writer.send(line);
        tokio::pin!(send);
        loop {
            tokio::select! {
                biased;
                _ = ctx.shutdown.cancelled() => return Err(WriteStop::Shutdown),
                sent = &mut send => {
                    sent.map_err(WriteStop::Failed)?;
                    break;
                }
                _ = tokio::time::sleep_until(keepalive.deadline()) => {
                    match keepalive.poll(Instant::now(), time_token) {
                        KeepaliveAction::Wait => {}
                        KeepaliveAction::SendPing(token) => {
                            debug!(token = %token, "idle during a pending write");
                            queue.push_back(format!("PING :{token}"));
                        }
                        KeepaliveAction::TimedOut => return Err(WriteStop::TimedOut),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Cancel the token, flush what the peer will still take, report `Closed`.
async fn finish<W>(mut writer: LineWriter<W>, ctx: &LoopContext)
where
    W: AsyncWrite + Unpin,
{
    ctx.shutdown.cancel();
    match tokio::time::timeout(CLOSE_GRACE, writer.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => trace!(error = %e, "error closing write half"),
        Err(_) => debug!("peer not reading, abandoning write half"),
    }
    ctx.emit(TransportEvent::Closed);
}

/// Resolve, run transport-level reactions, then emit in order:
/// named message, hostname, protocol error, catch-all.
fn process_inbound(ctx: &LoopContext, keepalive: &mut Keepalive, msg: WireMessage) -> Vec<String> {
    trace!(raw = %msg.raw, "recv");
    let msg = match ctx.resolver.resolve(&msg.command) {
        Some(name) => msg.with_command(name),
        None => msg,
    };

    let mut pending_writes = Vec::new();
    match msg.command.as_str() {
        "PONG" => {
            if keepalive.on_pong(msg.text()) {
                debug!("keepalive ping answered");
            }
        }
        NICKNAME_IN_USE => {
            let rejected = msg.param(1);
            match next_nickname(
                rejected,
                &ctx.config.nickname,
                ctx.config.alt_nickname.as_deref(),
            ) {
                Some(nick) => {
                    info!(rejected = %rejected, retry = %nick, "nickname in use");
                    pending_writes.push(format!("NICK {nick}"));
                }
                None => warn!(rejected = %rejected, "nickname in use, nothing left to try"),
            }
        }
        _ => {}
    }

    let msg = Arc::new(msg);
    ctx.emit(TransportEvent::Message(Arc::clone(&msg)));
    if msg.command == MOTD_START && !msg.prefix.is_empty() {
        ctx.emit(TransportEvent::Hostname(msg.prefix.clone()));
    }
    if msg.command.starts_with(ERROR_PREFIX) {
        ctx.emit(TransportEvent::ProtocolError {
            command: msg.command.clone(),
            message: msg.trailing.clone(),
        });
    }
    ctx.emit(TransportEvent::Data(msg));
    pending_writes
}
