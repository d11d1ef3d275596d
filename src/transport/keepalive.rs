//! Idle keepalive.
//!
//! Two timers share one deadline: the idle timer, measured from the last
//! inbound byte, and the ping-expiry timer armed when a PING goes out. At
//! most one PING is outstanding. The state machine is pure; the event loop
//! sleeps until [`Keepalive::deadline`] and calls [`Keepalive::poll`].
//!
//! ```text
//! {idle} --idle timeout--> {probing} --matching PONG--> {idle}
//!                                    --expiry--------> {timed out}
//! ```

use std::time::Duration;

use tokio::time::Instant;

use crate::config::KeepaliveConfig;

/// What the event loop should do after a [`Keepalive::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepaliveAction {
    /// Nothing is due yet.
    Wait,
    /// Send `PING :<token>`.
    SendPing(String),
    /// The PING expired without a matching PONG.
    TimedOut,
}

#[derive(Debug)]
struct PendingPing {
    token: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct Keepalive {
    idle_timeout: Duration,
    ping_timeout: Duration,
    last_activity: Instant,
    pending: Option<PendingPing>,
}

impl Keepalive {
    pub fn new(config: &KeepaliveConfig, now: Instant) -> Self {
        Self {
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            ping_timeout: Duration::from_secs(config.ping_timeout_secs),
            last_activity: now,
            pending: None,
        }
    }

    /// When the loop should next call [`poll`](Self::poll).
    pub fn deadline(&self) -> Instant {
        match &self.pending {
            Some(ping) => ping.expires_at,
            None => self.last_activity + self.idle_timeout,
        }
    }

    /// Restart the idle timer. An outstanding PING is unaffected.
    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    pub fn is_awaiting_pong(&self) -> bool {
        self.pending.is_some()
    }

    /// Disarm the pending PING if `token` matches it.
    pub fn on_pong(&mut self, token: &str) -> bool {
        match &self.pending {
            Some(ping) if ping.token == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Advance the state machine to `now`.
    pub fn poll(&mut self, now: Instant, make_token: impl FnOnce() -> String) -> KeepaliveAction {
        if let Some(ping) = &self.pending {
            if now >= ping.expires_at {
                self.pending = None;
                return KeepaliveAction::TimedOut;
            }
            return KeepaliveAction::Wait;
        }
        if now < self.last_activity + self.idle_timeout {
            return KeepaliveAction::Wait;
        }
        let token = make_token();
        self.pending = Some(PendingPing {
            token: token.clone(),
            expires_at: now + self.ping_timeout,
        });
        KeepaliveAction::SendPing(token)
    }

    /// Drop any outstanding PING.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// PING token: milliseconds since the Unix epoch.
pub fn time_token() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
