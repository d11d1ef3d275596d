//! # slirc-proto
//!
//! Sans-IO building blocks for the client side of the IRC protocol.
//!
//! ## Features
//!
//! - CRLF framing that survives arbitrary chunk boundaries ([`LineFramer`])
//! - Line parsing into tags, prefix, command, parameters and trailing text
//!   ([`WireMessage`])
//! - Hostmask splitting ([`Hostmask`])
//! - Numeric reply names ([`Response`], [`ReplyResolver`])
//! - Optional Tokio codec for async networking ([`IrcCodec`])
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_proto::{LineFramer, WireMessage};
//!
//! let mut framer = LineFramer::new();
//! let lines: Vec<_> = framer.push(b":nick!user@host PRIVMSG #rust :hi\r\n").collect();
//!
//! let msg = WireMessage::parse(std::str::from_utf8(&lines[0]).unwrap()).unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.params, vec!["#rust"]);
//! assert_eq!(msg.trailing, "hi");
//! assert_eq!(msg.hostmask().nick, "nick");
//! ```
//!
//! ## Acknowledgments
//!
//! This project was inspired by the architectural patterns established by
//! [Aaron Weiss (aatxe)](https://github.com/aatxe) in the
//! [irc](https://github.com/aatxe/irc) crate.

#![deny(clippy::all)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod framer;
pub mod hostmask;
#[cfg(feature = "tokio")]
pub mod irc;
pub mod line;
pub mod message;
pub mod response;

pub use self::error::{MessageParseError, ProtocolError};
pub use self::framer::{LineFramer, Lines};
pub use self::hostmask::Hostmask;
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
pub use self::line::{LineCodec, DELIMITER};
pub use self::message::{TagValue, Tags, WireMessage};
pub use self::response::{ReplyResolver, Response, StaticReplies};
