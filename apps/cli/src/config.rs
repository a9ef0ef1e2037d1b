//! Driver configuration loaded from environment variables
//!
//! Wraps the shared configuration with the values only the terminal
//! driver needs: the initial credential, the active playlist and the
//! filters used for the first fetch.

use std::env;

use anyhow::{Context, Result};
use tunedeck_discovery_client::Filters;
use tunedeck_session::gesture::GestureConfig;
use tunedeck_shared_config::{parse_env, CommonConfig};

/// Driver configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with the library crates
    pub common: CommonConfig,

    /// Bearer credential; when absent the session waits and times out
    pub token: Option<String>,

    /// Playlist liked tracks are added to
    pub active_playlist: Option<String>,

    /// Filters for the first fetch
    pub initial_filters: Filters,

    /// Card width used to interpret `swipe` commands
    pub card_width: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env().context("Failed to load common configuration")?;

        Ok(Self {
            common,
            token: non_empty_var("DISCOVERY_TOKEN"),
            active_playlist: non_empty_var("TUNEDECK_PLAYLIST"),
            initial_filters: filters_from(
                &env::var("TUNEDECK_GENRES").unwrap_or_default(),
                &env::var("TUNEDECK_LANGUAGES").unwrap_or_default(),
            ),
            card_width: parse_env("TUNEDECK_CARD_WIDTH", 360.0)
                .context("Invalid TUNEDECK_CARD_WIDTH value")?,
        })
    }

    pub fn gesture(&self) -> GestureConfig {
        GestureConfig::with_card_width(self.card_width)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Build filters from comma-separated genre and language lists
pub fn filters_from(genres: &str, languages: &str) -> Filters {
    let filters = genres.split(',').fold(Filters::new(), Filters::genre);
    languages.split(',').fold(filters, Filters::language)
}
