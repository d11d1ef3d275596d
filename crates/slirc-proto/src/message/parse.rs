//! Line parser.
//!
//! Order of segments: optional `@tags`, optional `:prefix`, command, middle
//! parameters, then an optional trailing parameter introduced by ` :`. Runs
//! of spaces between segments are skipped.

use std::str::FromStr;

use super::tags::{parse_tags, Tags};
use super::types::WireMessage;
use crate::error::MessageParseError;

const TAG_START: char = '@';
const PREFIX_START: char = ':';
const TRAILING_SEPARATOR: &str = " :";

impl FromStr for WireMessage {
    type Err = MessageParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut rest = line;

        let mut tags = Tags::new();
        if let Some(body) = rest.strip_prefix(TAG_START) {
            let (segment, after) = body
                .split_once(' ')
                .ok_or(MessageParseError::UnterminatedTags)?;
            tags = parse_tags(segment);
            rest = after;
        }
        rest = skip_spaces(rest);

        let mut prefix = "";
        if let Some(body) = rest.strip_prefix(PREFIX_START) {
            let (origin, after) = body
                .split_once(' ')
                .ok_or(MessageParseError::UnterminatedPrefix)?;
            prefix = origin;
            rest = skip_spaces(after);
        }

        let (command, rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(MessageParseError::MissingCommand);
        }

        let (params, trailing) = split_params(skip_spaces(rest));

        Ok(WireMessage {
            tags,
            prefix: prefix.to_owned(),
            command: command.to_owned(),
            params,
            trailing: trailing.to_owned(),
            raw: line.to_owned(),
        })
    }
}

fn skip_spaces(s: &str) -> &str {
    s.trim_start_matches(' ')
}

fn split_params(segment: &str) -> (Vec<String>, &str) {
    if let Some(trailing) = segment.strip_prefix(PREFIX_START) {
        return (Vec::new(), trailing);
    }
    let (middle, trailing) = segment
        .split_once(TRAILING_SEPARATOR)
        .unwrap_or((segment, ""));
    let params = middle
        .split(' ')
        .filter(|param| !param.is_empty())
        .map(str::to_owned)
        .collect();
    (params, trailing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::TagValue;

    fn parse(line: &str) -> WireMessage {
        line.parse().unwrap()
    }

    #[test]
    fn test_server_notice() {
        let msg = parse(":hitchcock.freenode.net NOTICE * :*** Looking up your hostname...");
        assert_eq!(msg.prefix, "hitchcock.freenode.net");
        assert_eq!(msg.command, "NOTICE");
        assert_eq!(msg.params, vec!["*"]);
        assert_eq!(msg.trailing, "*** Looking up your hostname...");
        assert!(msg.tags.is_empty());
    }

    #[test]
    fn test_privmsg_with_prefix() {
        let msg = parse(":a!b@c PRIVMSG #x :hello world");
        assert_eq!(msg.prefix, "a!b@c");
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#x"]);
        assert_eq!(msg.trailing, "hello world");
        assert_eq!(msg.raw, ":a!b@c PRIVMSG #x :hello world");
    }

    #[test]
    fn test_ping_trailing_only() {
        let msg = parse("PING :token");
        assert_eq!(msg.prefix, "");
        assert_eq!(msg.command, "PING");
        assert!(msg.params.is_empty());
        assert_eq!(msg.trailing, "token");
    }

    #[test]
    fn test_error_trailing_keeps_colons() {
        let msg = parse("ERROR :Closing Link: 127.0.0.1 (Connection timed out)");
        assert!(msg.params.is_empty());
        assert_eq!(msg.trailing, "Closing Link: 127.0.0.1 (Connection timed out)");
    }

    #[test]
    fn test_join_without_trailing() {
        let msg = parse(":tj!~tj@host.example JOIN #express");
        assert_eq!(msg.params, vec!["#express"]);
        assert_eq!(msg.trailing, "");
    }

    #[test]
    fn test_bare_command() {
        let msg = parse("FOO");
        assert_eq!(msg.command, "FOO");
        assert!(msg.params.is_empty());
        assert_eq!(msg.trailing, "");
    }

    #[test]
    fn test_prefix_and_command_with_trailing_spaces() {
        for line in [":test FOO", ":test FOO     "] {
            let msg = parse(line);
            assert_eq!(msg.prefix, "test");
            assert_eq!(msg.command, "FOO");
            assert!(msg.params.is_empty());
            assert_eq!(msg.trailing, "");
        }
    }

    #[test]
    fn test_trailing_preserves_inner_spaces() {
        let msg = parse(":test PRIVMSG foo :A string    with spaces   ");
        assert_eq!(msg.params, vec!["foo"]);
        assert_eq!(msg.trailing, "A string    with spaces   ");
    }

    #[test]
    fn test_space_runs_between_segments() {
        let msg = parse(":test     PRIVMSG    foo     :bar");
        assert_eq!(msg.prefix, "test");
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["foo"]);
        assert_eq!(msg.trailing, "bar");

        let msg = parse("FOO    bar    baz    quux");
        assert_eq!(msg.params, vec!["bar", "baz", "quux"]);
    }

    #[test]
    fn test_middle_params_and_trailing() {
        let msg = parse("FOO bar baz quux :This is a test");
        assert_eq!(msg.params, vec!["bar", "baz", "quux"]);
        assert_eq!(msg.trailing, "This is a test");
    }

    #[test]
    fn test_colon_inside_middle_param() {
        let msg = parse(":test PRIVMSG #fo:oo :This is a test");
        assert_eq!(msg.params, vec!["#fo:oo"]);
        assert_eq!(msg.trailing, "This is a test");
    }

    #[test]
    fn test_leading_colon_takes_whole_remainder() {
        let msg = parse("PRIVMSG :a b :c");
        assert!(msg.params.is_empty());
        assert_eq!(msg.trailing, "a b :c");
    }

    #[test]
    fn test_tags() {
        let msg = parse("@test=super;single :test!me@test.ing FOO bar baz quux :This is a test");
        assert_eq!(msg.tags["test"], TagValue::from("super"));
        assert_eq!(msg.tags["single"], TagValue::Flag(true));
        assert_eq!(msg.prefix, "test!me@test.ing");
        assert_eq!(msg.params, vec!["bar", "baz", "quux"]);

        let msg = parse("@a=1;b :x FOO :y");
        assert_eq!(msg.tags.len(), 2);
        assert_eq!(msg.tags["a"].as_str(), Some("1"));
        assert!(msg.tags["b"].is_flag());
        assert_eq!(msg.trailing, "y");
    }

    #[test]
    fn test_unterminated_segments_are_rejected() {
        assert_eq!(
            "@a=1;b".parse::<WireMessage>(),
            Err(MessageParseError::UnterminatedTags)
        );
        assert_eq!(
            ":server.only".parse::<WireMessage>(),
            Err(MessageParseError::UnterminatedPrefix)
        );
        assert_eq!("".parse::<WireMessage>(), Err(MessageParseError::MissingCommand));
        assert_eq!(":origin    ".parse::<WireMessage>(), Err(MessageParseError::MissingCommand));
        assert!(WireMessage::parse("@tags-only").is_none());
    }

    #[test]
    fn test_text_falls_back_to_last_param() {
        let msg = parse(":s PONG s 1700000000000");
        assert_eq!(msg.text(), "1700000000000");
        let msg = parse(":s PONG s :1700000000000");
        assert_eq!(msg.text(), "1700000000000");
    }

    #[test]
    fn test_numeric_detection() {
        assert!(parse(":s 001 me :Welcome").is_numeric());
        assert!(!parse("PRIVMSG #a :b").is_numeric());
    }
}
