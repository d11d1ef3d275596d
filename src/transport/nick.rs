//! Nickname collision recovery.
//!
//! When the configured nickname is rejected and an alternate exists, the
//! alternate is tried. Every other rejection bumps the last character to the
//! next code point (`evan` -> `evao`). This wraps into punctuation at
//! alphabet boundaries (`z` -> `{`) and is not guaranteed to find a free
//! nickname; it is kept for compatibility with existing behavior.

/// Nickname to retry with after `rejected` was reported in use.
///
/// `None` means no retry should be sent.
pub fn next_nickname(rejected: &str, configured: &str, alternate: Option<&str>) -> Option<String> {
    if rejected == configured
        && let Some(alt) = alternate.filter(|alt| !alt.is_empty())
    {
        return (alt != configured).then(|| alt.to_string());
    }

    let last = rejected.chars().next_back()?;
    let bumped = char::from_u32(u32::from(last) + 1)?;
    let mut nick = rejected[..rejected.len() - last.len_utf8()].to_string();
    nick.push(bumped);
    Some(nick)
}
