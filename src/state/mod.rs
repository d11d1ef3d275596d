//! Chat state containers.
//!
//! Channels, queries, their rosters and logs. These types are mutated only
//! by [`Session`](crate::session::Session).

mod channel;
mod message;
mod palette;
mod user;

pub use channel::{Channel, ChannelKind, ChannelSnapshot, NameEntry};
pub use message::{ChatMessage, ChatMessageBuilder, MessageKind};
pub use palette::{Palette, RotatingPalette};
pub use user::{PREFIX_RANKS, User, UserInfo, prefix_rank, split_prefixes};
