//! Unified error handling for slirc-client.
//!
//! Each layer owns its error type: configuration problems are fatal at
//! construction, transport failures arrive as events, and [`SessionError`]
//! covers caller mistakes against a live session.

use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::transport::TransportError;

// ============================================================================
// Session Errors (caller misuse)
// ============================================================================

/// Errors returned synchronously by [`Session`](crate::session::Session) methods.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("message type is required")]
    MissingMessageKind,

    #[error("no channel or query named {0}")]
    UnknownTarget(String),

    #[error("session is closed")]
    Closed,

    #[error("session is already connected")]
    AlreadyConnected,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
