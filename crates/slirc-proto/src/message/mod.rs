//! IRC message types and parsing.

mod parse;
/// Message tag parsing.
pub mod tags;
mod types;

pub use self::tags::{TagValue, Tags};
pub use self::types::WireMessage;
