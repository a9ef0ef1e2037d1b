//! Discovery backend client implementation

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, instrument, warn};
use tunedeck_shared_config::DiscoveryConfig;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{Decision, Filters, InteractionRecord, PlaylistTrackRequest, Track};
use crate::preferences::Preferences;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Maximum error body size kept in error messages
const MAX_ERROR_BODY_SIZE: usize = 500;

/// Maximum playlist identifier length
const MAX_PLAYLIST_ID_LENGTH: usize = 128;

/// Default number of retry attempts for idempotent calls
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds)
const RETRY_BASE_DELAY_MS: u64 = 100;

/// Discovery backend client
#[derive(Clone)]
pub struct DiscoveryClient {
    http_client: Client,
    config: DiscoveryConfig,
    preferences: Preferences,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl fmt::Debug for DiscoveryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryClient")
            .field("api_url", &self.config.api_url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl DiscoveryClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    /// Returns `DiscoveryError::Http` if the HTTP client cannot be built
    pub fn new(config: &DiscoveryConfig) -> DiscoveryResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self::with_client(config, http_client))
    }

    /// Create a client with a custom HTTP client (for testing)
    pub fn with_client(config: &DiscoveryConfig, http_client: Client) -> Self {
        Self {
            http_client,
            config: config.clone(),
            preferences: Preferences::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: RETRY_BASE_DELAY_MS,
        }
    }

    /// Share a preference holder with the host
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Set retry configuration for idempotent calls
    pub fn with_retry_config(mut self, max_retries: u32, base_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Build the interaction log entry for a decision, tagged with the configured source
    pub fn interaction_for(&self, track: &Track, decision: Decision) -> InteractionRecord {
        InteractionRecord::new(track, decision, self.config.source_tag.clone())
    }

    fn validate_token(token: &str) -> DiscoveryResult<&str> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(DiscoveryError::InvalidInput(
                "credential cannot be empty".to_string(),
            ));
        }
        Ok(trimmed)
    }

    fn validate_playlist_id(playlist_id: &str) -> DiscoveryResult<&str> {
        let trimmed = playlist_id.trim();
        if trimmed.is_empty() {
            return Err(DiscoveryError::InvalidInput(
                "playlist id cannot be empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_PLAYLIST_ID_LENGTH {
            return Err(DiscoveryError::InvalidInput(format!(
                "playlist id too long (max {} characters)",
                MAX_PLAYLIST_ID_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DiscoveryError::InvalidInput(format!(
                "playlist id '{}' contains invalid characters",
                trimmed
            )));
        }
        Ok(trimmed)
    }

    /// Truncate error body, respecting UTF-8 boundaries
    fn truncate_error_body(body: String) -> String {
        if body.len() <= MAX_ERROR_BODY_SIZE {
            return body;
        }

        let truncate_at = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
            .last()
            .unwrap_or(0);

        format!("{}... (truncated)", &body[..truncate_at])
    }

    /// Execute an operation with retry logic for transient failures
    async fn with_retry<T, F, Fut>(&self, operation: F) -> DiscoveryResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = DiscoveryResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay_ms = self.retry_base_delay_ms * 2u64.pow(attempt);
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Discovery request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send a request and map transport and status failures
    async fn send(&self, request: RequestBuilder, token: &str) -> DiscoveryResult<Response> {
        let response = request.bearer_auth(token).send().await.map_err(|e| {
            if e.is_timeout() {
                DiscoveryError::Timeout
            } else {
                DiscoveryError::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DiscoveryError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Discovery API rate limited");
                Err(DiscoveryError::RateLimited)
            }
            _ => {
                let body = Self::truncate_error_body(response.text().await.unwrap_or_default());
                Err(DiscoveryError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }

    /// Fetch one recommended track for the given filters
    ///
    /// # Errors
    /// - `DiscoveryError::InvalidInput` - If the credential is blank
    /// - `DiscoveryError::Unauthorized` - If the backend rejects the credential
    /// - `DiscoveryError::NoRecommendation` - If nothing matches the filters
    /// - `DiscoveryError::Api` / `DiscoveryError::Http` - On backend or transport failures
    #[instrument(skip(self, token))]
    pub async fn recommend(&self, token: &str, filters: &Filters) -> DiscoveryResult<Track> {
        let token = Self::validate_token(token)?;

        let request = self
            .http_client
            .get(self.config.recommendations_url())
            .query(&filters.query_pairs());

        let response = self.send(request, token).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(DiscoveryError::NoRecommendation);
        }

        let text = response.text().await?;
        let track: Track = serde_json::from_str(&text)?;

        debug!(track_id = %track.id, title = %track.title, "Received recommendation");

        Ok(track)
    }

    /// Post an interaction log entry
    #[instrument(skip(self, token, record), fields(track_id = %record.track_id, decision = %record.decision))]
    pub async fn log_interaction(
        &self,
        token: &str,
        record: &InteractionRecord,
    ) -> DiscoveryResult<()> {
        let token = Self::validate_token(token)?;

        let request = self
            .http_client
            .post(self.config.interactions_url())
            .json(record);
        self.send(request, token).await?;

        debug!("Interaction logged");
        Ok(())
    }

    /// Add a track to a playlist, retrying transient failures
    #[instrument(skip(self, token))]
    pub async fn add_to_playlist(
        &self,
        token: &str,
        playlist_id: &str,
        track_id: &str,
    ) -> DiscoveryResult<()> {
        let token = Self::validate_token(token)?;
        let playlist_id = Self::validate_playlist_id(playlist_id)?;
        let url = self.config.playlist_tracks_url(playlist_id);

        self.with_retry(|| async {
            let request = self
                .http_client
                .post(&url)
                .json(&PlaylistTrackRequest { track_id });
            self.send(request, token).await.map(|_| ())
        })
        .await?;

        debug!("Track added to playlist");
        Ok(())
    }

    /// Add a track to the active playlist from preferences
    ///
    /// Returns `Ok(false)` when no playlist is active.
    pub async fn add_to_active_playlist(&self, token: &str, track: &Track) -> DiscoveryResult<bool> {
        match self.preferences.active_playlist_id() {
            Some(playlist_id) => {
                self.add_to_playlist(token, &playlist_id, &track.id).await?;
                Ok(true)
            }
            None => {
                debug!(track_id = %track.id, "No active playlist, skipping association");
                Ok(false)
            }
        }
    }
}
