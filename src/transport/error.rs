//! Transport error types.

use thiserror::Error;

/// Socket-level failures. Delivered as
/// [`TransportEvent::Error`](super::TransportEvent::Error), never returned
/// from the event loop.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    #[error("tls handshake failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] slirc_proto::ProtocolError),
}
