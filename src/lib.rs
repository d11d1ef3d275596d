//! slirc-client - Straylight IRC client engine.
//!
//! Turns one server connection into consistent chat state:
//!
//! - [`transport`] owns the socket, the registration handshake, keepalive
//!   probing and nickname-collision recovery.
//! - [`session`] consumes transport events and is the only writer of
//!   channel, query and roster state.
//! - [`state`] holds the channel, user and log entry types.
//! - [`config`] loads and validates the TOML configuration.
//!
//! Line framing and message parsing live in the `slirc-proto` crate.
//!
//! ```no_run
//! use slirc_client::config::{ServerTarget, SessionConfig, UserIdentity};
//! use slirc_client::session::Session;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = SessionConfig::new("libera", UserIdentity::new("evan"), ServerTarget::new("irc.libera.chat"));
//! let mut session = Session::new(config)?;
//! let mut events = session.connect()?;
//! while let Some(event) = events.recv().await {
//!     session.handle_transport_event(event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod handlers;
pub mod session;
pub mod state;
pub mod transport;

pub use config::{ClientConfig, SessionConfig};
pub use error::SessionError;
pub use session::{Session, SessionEvent, SessionObserver};
pub use transport::{TransportEvent, TransportHandle};
