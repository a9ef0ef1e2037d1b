//! Discovery backend error types

use thiserror::Error;

/// Discovery client errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Invalid input provided to a client method
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse discovery response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Credential rejected by the backend
    #[error("Not authorized, please sign in again")]
    Unauthorized,

    /// Rate limited by the backend
    #[error("Too many requests, slow down")]
    RateLimited,

    /// Request timeout
    #[error("Request to the discovery service timed out")]
    Timeout,

    /// Backend had nothing to recommend for the given filters
    #[error("No recommendations match the current filters")]
    NoRecommendation,

    /// Backend returned an unexpected status
    #[error("Discovery service error {status}: {message}")]
    Api { status: u16, message: String },
}

impl DiscoveryError {
    /// Check if this error is retryable (transient failure)
    ///
    /// Retries on timeouts, rate limiting, connect failures and 5xx
    /// responses. Client errors are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            DiscoveryError::Timeout | DiscoveryError::RateLimited => true,
            DiscoveryError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            DiscoveryError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
