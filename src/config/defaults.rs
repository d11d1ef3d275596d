//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

pub const PLAIN_PORT: u16 = 6667;
pub const SECURE_PORT: u16 = 6697;

// =============================================================================
// Keepalive Defaults
// =============================================================================

/// Seconds without inbound data before a PING is sent.
pub fn default_idle_timeout() -> u64 {
    300
}

/// Seconds to wait for the matching PONG.
pub fn default_ping_timeout() -> u64 {
    15
}

// =============================================================================
// Settings Defaults
// =============================================================================

pub fn default_message_limit() -> usize {
    300
}

pub fn default_part_message() -> String {
    "slirc-client https://github.com/sid3xyz/slircd-ng".to_string()
}
