//! slirc-client - terminal front end for the Straylight IRC client engine.
//!
//! Reads a TOML configuration, connects one session, prints session events
//! through `tracing`, and takes commands on stdin.

use slirc_client::config::ClientConfig;
use slirc_client::session::{Session, SessionEvent};
use slirc_client::transport::TransportEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type TransportEvents = Option<UnboundedReceiver<TransportEvent>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = ClientConfig::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;
    let snapshot_path = config.snapshot_path.clone();

    let mut session = Session::new(config.session)?;
    info!(
        session = %session.name(),
        host = %session.server().host,
        nick = %session.nick(),
        "Starting slirc-client"
    );

    let mut session_events = session.events();
    let mut transport_events: TransportEvents = None;
    if session.settings().auto_connect {
        transport_events = Some(session.connect()?);
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut quitting = false;

    loop {
        tokio::select! {
            event = next_transport_event(&mut transport_events) => {
                let closed = matches!(event, None | Some(TransportEvent::Closed));
                if let Some(event) = event {
                    session.handle_transport_event(event);
                }
                if closed {
                    transport_events = None;
                    if quitting {
                        break;
                    }
                }
            }
            Some(event) = session_events.recv() => render(&event),
            line = stdin.next_line(), if !quitting => match line? {
                Some(line) => match run_command(&mut session, &mut transport_events, line.trim()) {
                    Command::Continue => {}
                    Command::Quit if transport_events.is_some() => quitting = true,
                    Command::Quit => break,
                },
                None => break,
            },
        }
    }

    session.close();
    while let Ok(event) = session_events.try_recv() {
        render(&event);
    }

    if let Some(path) = snapshot_path {
        let json = session.snapshot().to_json()?;
        tokio::fs::write(&path, json).await?;
        info!(path = %path.display(), "Snapshot written");
    }
    Ok(())
}

async fn next_transport_event(events: &mut TransportEvents) -> Option<TransportEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

enum Command {
    Continue,
    Quit,
}

fn run_command(session: &mut Session, transport_events: &mut TransportEvents, line: &str) -> Command {
    if line.is_empty() {
        return Command::Continue;
    }
    let Some(command) = line.strip_prefix('/') else {
        session.write(line);
        return Command::Continue;
    };
    let (verb, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();

    match verb.to_ascii_lowercase().as_str() {
        "connect" => match session.connect() {
            Ok(events) => *transport_events = Some(events),
            Err(e) => warn!(error = %e, "Cannot connect"),
        },
        "join" if !rest.is_empty() => session.join(rest),
        "part" if !rest.is_empty() => session.part(rest),
        "whois" if !rest.is_empty() => session.whois(rest),
        "msg" => match rest.split_once(' ') {
            Some((target, text)) => {
                if let Err(e) = session.send_message(target, text) {
                    warn!(error = %e, "Cannot send");
                }
            }
            None => warn!("usage: /msg <target> <text>"),
        },
        "me" => {
            let target = session.current_panel().map(|chan| chan.name().to_string());
            match target {
                Some(target) => {
                    if let Err(e) = session.send_action(&target, rest) {
                        warn!(error = %e, "Cannot send");
                    }
                }
                None => warn!("no channel or query selected"),
            }
        }
        "next" => {
            if let Some(chan) = session.next_panel() {
                info!(panel = %chan.name(), "Selected");
            }
        }
        "prev" => {
            if let Some(chan) = session.previous_panel() {
                info!(panel = %chan.name(), "Selected");
            }
        }
        "quit" => {
            let reason = if rest.is_empty() {
                session.settings().part_message.clone()
            } else {
                rest.to_string()
            };
            session.write(format!("QUIT :{reason}"));
            return Command::Quit;
        }
        _ => warn!(command = %verb, "Unknown command"),
    }
    Command::Continue
}

fn render(event: &SessionEvent) {
    match event {
        SessionEvent::Log(msg) => info!(kind = ?msg.kind, from = %msg.from, "{}", msg.message),
        SessionEvent::ChannelLog { channel, message } => {
            info!(channel = %channel, kind = ?message.kind, from = %message.from, "{}", message.message);
        }
        SessionEvent::Mention { channel, message } => {
            warn!(channel = %channel, from = %message.from, "Mentioned: {}", message.message);
        }
        SessionEvent::ChannelAdded { name } => info!(channel = %name, "Channel added"),
        SessionEvent::ChannelRemoved { name } => info!(channel = %name, "Channel removed"),
        SessionEvent::QueryAdded { name } => info!(query = %name, "Query added"),
        SessionEvent::QueryRemoved { name } => info!(query = %name, "Query removed"),
        SessionEvent::ChannelUpdated { .. } => {}
        SessionEvent::Whois(record) => info!(
            nick = %record.nickname,
            user = %record.username,
            host = %record.hostname,
            realname = %record.realname,
            channels = %record.channels.join(" "),
            server = ?record.server,
            away = ?record.away,
            oper = record.oper,
            "WHOIS"
        ),
        SessionEvent::Invite(invite) => {
            info!(from = %invite.from, channel = %invite.channel, "Invited");
        }
    }
}
