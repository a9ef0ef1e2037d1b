//! Recommendation session configuration

use std::time::Duration;

use crate::{parse_env, parse_optional_env, ConfigError, ConfigResult};

/// Retries after the first credential check
const DEFAULT_TOKEN_WAIT_RETRIES: u32 = 5;

/// Fixed delay between credential checks (milliseconds)
const DEFAULT_TOKEN_WAIT_DELAY_MS: u64 = 500;

/// Capacity of the session command channel
const DEFAULT_COMMAND_BUFFER: usize = 32;

/// Tuning for the recommendation session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How many times to re-check for a credential before giving up
    pub token_wait_retries: u32,

    /// Delay between credential checks in milliseconds
    pub token_wait_delay_ms: u64,

    /// Maximum undo history length; `None` keeps every entry
    pub history_limit: Option<usize>,

    /// Capacity of the command channel feeding the session driver
    pub command_buffer: usize,
}

impl SessionConfig {
    /// Load session configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            token_wait_retries: parse_env("SESSION_TOKEN_WAIT_RETRIES", DEFAULT_TOKEN_WAIT_RETRIES)?,
            token_wait_delay_ms: parse_env(
                "SESSION_TOKEN_WAIT_DELAY_MS",
                DEFAULT_TOKEN_WAIT_DELAY_MS,
            )?,
            history_limit: parse_optional_env("SESSION_HISTORY_LIMIT")?,
            command_buffer: parse_env("SESSION_COMMAND_BUFFER", DEFAULT_COMMAND_BUFFER)?,
        };

        if config.history_limit == Some(0) {
            return Err(ConfigError::ValidationError(
                "SESSION_HISTORY_LIMIT must be at least 1 when set".to_string(),
            ));
        }
        if config.command_buffer == 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_COMMAND_BUFFER must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// Delay between credential checks
    pub fn token_wait_delay(&self) -> Duration {
        Duration::from_millis(self.token_wait_delay_ms)
    }

    /// Total time spent waiting for a credential before timing out
    pub fn token_wait_budget(&self) -> Duration {
        self.token_wait_delay() * self.token_wait_retries
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_wait_retries: DEFAULT_TOKEN_WAIT_RETRIES,
            token_wait_delay_ms: DEFAULT_TOKEN_WAIT_DELAY_MS,
            history_limit: None,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_token_budget_is_two_and_a_half_seconds() {
        let config = SessionConfig::default();
        assert_eq!(config.token_wait_budget(), Duration::from_millis(2500));
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn test_from_env_history_limit() {
        temp_env::with_var("SESSION_HISTORY_LIMIT", Some("50"), || {
            let config = SessionConfig::from_env().unwrap();
            assert_eq!(config.history_limit, Some(50));
        });
    }

    #[test]
    fn test_from_env_rejects_zero_history_limit() {
        temp_env::with_var("SESSION_HISTORY_LIMIT", Some("0"), || {
            assert!(matches!(
                SessionConfig::from_env(),
                Err(ConfigError::ValidationError(_))
            ));
        });
    }
}
