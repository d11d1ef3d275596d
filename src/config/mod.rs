//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (ClientConfig, SessionConfig, UserIdentity, ServerTarget)
//! - [`settings`]: Per-session settings with dotted keys
//! - [`defaults`]: Default value functions used by serde
//! - [`validation`]: Eager checks for required fields

mod defaults;
mod settings;
mod types;
pub mod validation;

pub use settings::Settings;
pub use types::{ClientConfig, ConfigError, KeepaliveConfig, ServerTarget, SessionConfig, UserIdentity};
