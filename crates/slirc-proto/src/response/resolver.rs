//! Numeric-to-name resolution.

use super::Response;

/// Maps a numeric reply code to its symbolic command name.
///
/// Implementations return `None` for codes they do not know; callers keep the
/// numeric string in that case.
pub trait ReplyResolver: Send + Sync {
    /// Resolve a command token such as `"001"`.
    fn resolve(&self, command: &str) -> Option<&'static str>;
}

/// Resolver backed by the built-in [`Response`] table.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticReplies;

impl ReplyResolver for StaticReplies {
    fn resolve(&self, command: &str) -> Option<&'static str> {
        if command.len() != 3 {
            return None;
        }
        command.parse::<Response>().ok().map(|resp| resp.name())
    }
}
