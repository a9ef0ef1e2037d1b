//! Discovery backend configuration types

use crate::{get_env_or_default, parse_env, ConfigError, ConfigResult};

/// Default discovery API base URL
const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default source tag attached to interaction logs
const DEFAULT_SOURCE_TAG: &str = "swipe";

/// Remote discovery backend configuration
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Base URL of the discovery API
    pub api_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Source tag sent with every interaction log
    pub source_tag: String,

    /// User-Agent header for outgoing requests
    pub user_agent: String,
}

impl DiscoveryConfig {
    /// Load discovery configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            api_url: get_env_or_default("DISCOVERY_API_URL", DEFAULT_API_URL),
            timeout_secs: parse_env("DISCOVERY_TIMEOUT", 10)?,
            source_tag: get_env_or_default("DISCOVERY_SOURCE_TAG", DEFAULT_SOURCE_TAG),
            user_agent: get_env_or_default("DISCOVERY_USER_AGENT", "Tunedeck/1.0"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            api_url: url.into(),
            ..Self::default()
        }
    }

    /// Reject configurations the client cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "DISCOVERY_API_URL".to_string(),
                format!("expected an http(s) URL, got '{}'", self.api_url),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "DISCOVERY_TIMEOUT must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Get the full URL for the recommendation endpoint
    pub fn recommendations_url(&self) -> String {
        format!("{}/recommendations", self.base())
    }

    /// Get the full URL for the interaction log endpoint
    pub fn interactions_url(&self) -> String {
        format!("{}/interactions", self.base())
    }

    /// Get the full URL for adding tracks to a playlist
    pub fn playlist_tracks_url(&self, playlist_id: &str) -> String {
        format!("{}/playlists/{}/tracks", self.base(), playlist_id)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 10,
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
            user_agent: "Tunedeck/1.0".to_string(),
        }
    }
}
