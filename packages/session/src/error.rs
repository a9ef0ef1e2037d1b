//! Session error types

use thiserror::Error;
use tunedeck_discovery_client::DiscoveryError;

/// Errors surfaced by the recommendation session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No credential became available within the wait budget
    #[error("Timed out waiting for sign-in after {waited_ms} ms")]
    TokenTimeout { attempts: u32, waited_ms: u64 },

    /// Transport or backend failure, message passed through from the client
    #[error("{0}")]
    Network(String),

    /// Request was superseded by a newer fetch or the session shut down
    #[error("Request superseded")]
    Cancelled,
}

impl SessionError {
    /// Whether the error should be shown to the user
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl From<DiscoveryError> for SessionError {
    fn from(e: DiscoveryError) -> Self {
        Self::Network(e.to_string())
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
