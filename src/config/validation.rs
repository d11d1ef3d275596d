//! Configuration validation.
//!
//! Required fields are checked before any session or socket exists.

use super::types::{ConfigError, SessionConfig};

/// Validate a session configuration, returning all errors found.
pub fn validate(config: &SessionConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.name.is_empty() {
        errors.push(ConfigError::MissingName);
    }
    if config.user.nickname.is_empty() {
        errors.push(ConfigError::MissingNickname);
    }
    if config.server.host.is_empty() {
        errors.push(ConfigError::MissingHost);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerTarget, UserIdentity};

    fn valid() -> SessionConfig {
        SessionConfig::new("net", UserIdentity::new("me"), ServerTarget::new("irc.example.net"))
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid()).is_ok());
    }

    #[test]
    fn test_collects_every_missing_field() {
        let errors = validate(&SessionConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ConfigError::MissingName));
        assert!(matches!(errors[1], ConfigError::MissingNickname));
        assert!(matches!(errors[2], ConfigError::MissingHost));
    }

    #[test]
    fn test_first_error_reported() {
        let mut config = valid();
        config.server.host.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingHost)));
    }
}
